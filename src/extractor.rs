/*

    The bounding box camera itself: owns the mode and image dims,
    runs the per-frame extraction over a rendered id buffer and a
    scene snapshot, publishes the merged result to subscribers and
    offers the debug draw entry point.

    Everything per-frame (visibility maps, boundaries, per-part boxes)
    lives inside update() and is dropped on every exit path; only the
    configuration and the last published list survive between frames.

    @date: 21 Nov, 2025
    @author: bartu
*/

use crate::boxes::{BoundingBox, BoundingBoxType};
use crate::builder::{boxes_3d, full_boxes_2d, visible_boxes_2d};
use crate::camera::Camera;
use crate::event::{Connection, Event};
use crate::idbuffer::{CHANNEL_COUNT, mark_visible};
use crate::merger::{merge_multi_links_2d, merge_multi_links_3d};
use crate::prelude::*;
use crate::rasterizer::draw_box;
use crate::scene::SceneSnapshot;

pub struct BoundingBoxCamera {
    box_type: BoundingBoxType,
    image_width: u32,
    image_height: u32,
    background_label: u32,

    output_boxes: Vec<BoundingBox>,
    // Projection of the camera of the last processed frame, kept for
    // the debug draw entry point
    last_projection: Matrix4,
    new_boxes: Event<[BoundingBox]>,
}

impl BoundingBoxCamera {
    pub fn new(image_width: u32, image_height: u32, background_label: u32) -> Self {
        Self {
            box_type: BoundingBoxType::default(),
            image_width,
            image_height,
            background_label,
            output_boxes: Vec::new(),
            last_projection: Matrix4::IDENTITY,
            new_boxes: Event::new(),
        }
    }

    pub fn set_box_type(&mut self, box_type: BoundingBoxType) {
        self.box_type = box_type;
    }

    pub fn box_type(&self) -> BoundingBoxType {
        self.box_type
    }

    pub fn set_image_width(&mut self, width: u32) {
        self.image_width = width;
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn set_image_height(&mut self, height: u32) {
        self.image_height = height;
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn background_label(&self) -> u32 {
        self.background_label
    }

    /// The boxes published for the last processed frame.
    ///
    /// WARNING: frames processed with zero subscribers skip the box
    /// computation entirely, and this accessor then reads an empty
    /// list. Subscribe before relying on it.
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.output_boxes
    }

    /// Register a per-frame callback. Dropping the returned connection
    /// unsubscribes. Multiple independent subscribers are fine; they
    /// are notified synchronously, in subscription order.
    #[must_use = "dropping the connection immediately unsubscribes the callback"]
    pub fn connect_new_boxes(
        &self,
        callback: impl FnMut(&[BoundingBox]) + 'static,
    ) -> Connection<[BoundingBox]> {
        self.new_boxes.connect(callback)
    }

    /// Process one rendered frame: decode the id buffer, build boxes
    /// in the configured mode, merge multi-part models and notify the
    /// subscribers.
    pub fn update(&mut self, snapshot: &SceneSnapshot, camera: &Camera, buffer: &[u8]) {
        self.output_boxes.clear();
        self.last_projection = *camera.projection_matrix();

        // No one is listening to the new frame
        if self.new_boxes.connection_count() == 0 {
            debug!("No bounding box subscribers, skipping the frame");
            return;
        }

        let expected = (self.image_width * self.image_height) as usize * CHANNEL_COUNT;
        if buffer.len() != expected {
            error!(
                "Id buffer has {} bytes, expected {} ({}x{}x3), skipping the frame",
                buffer.len(),
                expected,
                self.image_width,
                self.image_height
            );
            return;
        }

        self.output_boxes = match self.box_type {
            BoundingBoxType::VisibleBox2D => {
                let (_, boxes) = visible_boxes_2d(
                    buffer,
                    self.image_width,
                    self.image_height,
                    self.background_label,
                );
                let parents = snapshot.parent_names();
                merge_multi_links_2d(&boxes, &parents)
            }
            BoundingBoxType::FullBox2D => {
                let visible = mark_visible(
                    buffer,
                    self.image_width,
                    self.image_height,
                    self.background_label,
                );
                let boxes = full_boxes_2d(
                    snapshot,
                    camera,
                    &visible,
                    self.image_width,
                    self.image_height,
                );
                let parents = snapshot.parent_names();
                merge_multi_links_2d(&boxes, &parents)
            }
            BoundingBoxType::Box3D => {
                let visible = mark_visible(
                    buffer,
                    self.image_width,
                    self.image_height,
                    self.background_label,
                );
                let boxes = boxes_3d(snapshot, camera, &visible);
                merge_multi_links_3d(&boxes, &visible, snapshot, camera)
            }
        };

        self.new_boxes.emit(&self.output_boxes);
    }

    /// Overwrite the outline pixels of one box in a preallocated RGB
    /// buffer (width * height * 3 bytes, the configured dimensions).
    /// The color is currently ignored; outlines are green.
    pub fn draw_bounding_box(&self, data: &mut [u8], color: Vector3, bbox: &BoundingBox) {
        let expected = (self.image_width * self.image_height) as usize * CHANNEL_COUNT;
        if data.len() != expected {
            error!(
                "Draw target has {} bytes, expected {}, not drawing",
                data.len(),
                expected
            );
            return;
        }
        draw_box(
            data,
            self.image_width,
            self.image_height,
            &self.last_projection,
            color,
            bbox,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Aabb;
    use crate::idbuffer::IdPalette;
    use crate::mesh::{Mesh, SubMesh, Transform};
    use crate::scene::ObjectRecord;
    use std::cell::RefCell;
    use std::rc::Rc;

    const BACKGROUND: u32 = 255;

    fn identity_camera() -> Camera {
        Camera::new(Matrix4::IDENTITY, Matrix4::IDENTITY, 0.1, 100.0)
    }

    fn record(id: u32, parent: &str) -> ObjectRecord {
        let corners: Vec<Vector3> = Aabb::new(Vector3::splat(-0.5), Vector3::splat(0.5))
            .corners()
            .to_vec();
        ObjectRecord::new(
            id,
            parent,
            Transform::IDENTITY,
            Mesh::new(vec![SubMesh::from_positions(&corners)]),
        )
        .unwrap()
    }

    fn paint_block(buffer: &mut [u8], width: u32, color: [u8; 3], x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                let index = ((y * width + x) as usize) * CHANNEL_COUNT;
                buffer[index..index + 3].copy_from_slice(&color);
            }
        }
    }

    #[test]
    fn test_box_type_round_trip() {
        let mut camera = BoundingBoxCamera::new(200, 200, BACKGROUND);
        assert_eq!(camera.box_type(), BoundingBoxType::VisibleBox2D);

        camera.set_box_type(BoundingBoxType::FullBox2D);
        assert_eq!(camera.box_type(), BoundingBoxType::FullBox2D);
    }

    #[test]
    fn test_zero_subscriber_frames_are_skipped() {
        let (width, height) = (20u32, 20u32);
        let palette = IdPalette::new(BACKGROUND);
        let mut buffer = vec![BACKGROUND as u8; (width * height) as usize * CHANNEL_COUNT];
        paint_block(&mut buffer, width, palette.encode(1, 2), 5, 5, 9, 9);

        let snapshot = SceneSnapshot::new(vec![record(1, "solo")]);
        let mut camera = BoundingBoxCamera::new(width, height, BACKGROUND);

        camera.update(&snapshot, &identity_camera(), &buffer);
        assert!(camera.boxes().is_empty()); // skipped, nothing computed

        let seen = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&seen);
        let _connection = camera.connect_new_boxes(move |boxes| {
            *sink.borrow_mut() += boxes.len();
        });

        camera.update(&snapshot, &identity_camera(), &buffer);
        assert_eq!(camera.boxes().len(), 1);
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn test_visible_mode_merges_parts_and_resets_state() {
        let (width, height) = (20u32, 20u32);
        let palette = IdPalette::new(BACKGROUND);
        let mut buffer = vec![BACKGROUND as u8; (width * height) as usize * CHANNEL_COUNT];
        // Two parts of the same model: pixels 2..=5 and 10..=13 on x
        paint_block(&mut buffer, width, palette.encode(1, 7), 2, 4, 5, 7);
        paint_block(&mut buffer, width, palette.encode(2, 7), 10, 4, 13, 7);

        let snapshot = SceneSnapshot::new(vec![record(1, "robot"), record(2, "robot")]);
        let mut camera = BoundingBoxCamera::new(width, height, BACKGROUND);

        let published = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&published);
        let _connection = camera.connect_new_boxes(move |boxes| {
            *sink.borrow_mut() = boxes.to_vec();
        });

        camera.update(&snapshot, &identity_camera(), &buffer);

        assert_eq!(camera.boxes().len(), 1);
        let merged = &camera.boxes()[0];
        assert_eq!(merged.label, 7);
        // Part boxes are center (3,5)/(11,5), size (3,3). The union is
        // rebuilt from truncated half-extent corners (1,3)..(12,6), so
        // size = (11, 3) and center = (1 + 11/2, 3 + 3/2) in u32 math.
        assert_eq!(merged.size, Vector3::new(11.0, 3.0, 0.0));
        assert_eq!(merged.center, Vector3::new(6.0, 4.0, 0.0));
        assert_eq!(*published.borrow(), camera.boxes());

        // Next frame is empty: per-frame state must not leak through
        let empty = vec![BACKGROUND as u8; (width * height) as usize * CHANNEL_COUNT];
        camera.update(&snapshot, &identity_camera(), &empty);
        assert!(camera.boxes().is_empty());
        assert!(published.borrow().is_empty());
    }

    #[test]
    fn test_mismatched_buffer_is_reported_not_fatal() {
        let snapshot = SceneSnapshot::new(vec![]);
        let mut camera = BoundingBoxCamera::new(20, 20, BACKGROUND);
        let _connection = camera.connect_new_boxes(|_| {});

        camera.update(&snapshot, &identity_camera(), &[0u8; 7]);
        assert!(camera.boxes().is_empty());

        // The camera stays usable afterwards
        let buffer = vec![BACKGROUND as u8; 20 * 20 * CHANNEL_COUNT];
        camera.update(&snapshot, &identity_camera(), &buffer);
        assert!(camera.boxes().is_empty());
    }

    #[test]
    fn test_draw_rejects_wrong_buffer_size() {
        let camera = BoundingBoxCamera::new(20, 20, BACKGROUND);
        let mut tiny = [0u8; 5];
        let bbox = BoundingBox::new(BoundingBoxType::VisibleBox2D);
        camera.draw_bounding_box(&mut tiny, Vector3::ZERO, &bbox);
        assert!(tiny.iter().all(|&byte| byte == 0));
    }
}
