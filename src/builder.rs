/*

    Build one bounding box per visible object, in whichever of the
    three modes the camera is configured for. The 2D visible mode
    works purely from decoded pixels; the other two consult the scene
    snapshot and project geometry.

    @date: 17 Nov, 2025
    @author: bartu
*/

use std::collections::BTreeMap;

use crate::boxes::{BoundingBox, BoundingBoxType};
use crate::camera::Camera;
use crate::idbuffer::scan_boundaries;
use crate::mesh::extents_outside_frustum;
use crate::prelude::*;
use crate::scene::SceneSnapshot;

/// Tight boxes around the actually rendered pixels of every visible
/// object. Returns the id -> label map of the sweep alongside the
/// boxes (the merger needs both).
pub fn visible_boxes_2d(
    buffer: &[u8],
    width: u32,
    height: u32,
    background_label: u32,
) -> (BTreeMap<u32, u32>, BTreeMap<u32, BoundingBox>) {
    let (labels, boundaries) = scan_boundaries(buffer, width, height, background_label);

    let mut boxes = BTreeMap::new();
    for (&id, boundary) in &boundaries {
        let box_width = boundary.max_x - boundary.min_x;
        let box_height = boundary.max_y - boundary.min_y;

        let mut bbox = BoundingBox::new(BoundingBoxType::VisibleBox2D);
        // Integer center, as the pixel sweep reports it
        bbox.center = Vector3::new(
            (boundary.min_x + box_width / 2) as Float,
            (boundary.min_y + box_height / 2) as Float,
            0.0,
        );
        bbox.size = Vector3::new(box_width as Float, box_height as Float, 0.0);
        bbox.label = labels[&id];

        boxes.insert(id, bbox);
    }

    (labels, boxes)
}

/// Full projected boxes (occluded parts included) of every object that
/// contributed at least one pixel and intersects the camera frustum.
pub fn full_boxes_2d(
    snapshot: &SceneSnapshot,
    camera: &Camera,
    visible: &BTreeMap<u32, u32>,
    width: u32,
    height: u32,
) -> BTreeMap<u32, BoundingBox> {
    let mut boxes = BTreeMap::new();

    for object in &snapshot.objects {
        // Skip objects hidden in the id map
        let Some(&label) = visible.get(&object.id) else {
            continue;
        };

        // Filter the boxes outside the camera frustum
        if !camera.is_visible(&object.world_aabb) {
            continue;
        }

        let (mut min_vertex, mut max_vertex) = object.mesh.screen_extents(
            &object.transform,
            camera.view_matrix(),
            camera.projection_matrix(),
        );

        if extents_outside_frustum(&min_vertex, &max_vertex) {
            continue;
        }

        convert_to_screen_coord(&mut min_vertex, &mut max_vertex, width, height);

        let mut bbox = BoundingBox::new(BoundingBoxType::FullBox2D);
        let box_width = max_vertex.x - min_vertex.x;
        // The screen conversion flips y, so the ndc minimum is the
        // larger pixel row
        let box_height = min_vertex.y - max_vertex.y;
        bbox.center = Vector3::new(
            min_vertex.x + box_width / 2.0,
            max_vertex.y + box_height / 2.0,
            0.0,
        );
        bbox.size = Vector3::new(box_width, box_height, 0.0);
        bbox.label = label;

        boxes.insert(object.id, bbox);
    }

    boxes
}

/// Oriented 3D boxes in camera coordinates from the objects' world
/// extents. Orientation composes the camera rotation with the object's
/// world rotation, not the world rotation alone.
pub fn boxes_3d(
    snapshot: &SceneSnapshot,
    camera: &Camera,
    visible: &BTreeMap<u32, u32>,
) -> BTreeMap<u32, BoundingBox> {
    let mut boxes = BTreeMap::new();
    let view_rotation = camera.view_rotation();

    for object in &snapshot.objects {
        let Some(&label) = visible.get(&object.id) else {
            continue;
        };
        if !camera.is_visible(&object.world_aabb) {
            continue;
        }

        let mut bbox = BoundingBox::new(BoundingBoxType::Box3D);
        bbox.center = transform_point(camera.view_matrix(), &object.world_aabb.center());
        bbox.size = object.local_aabb.size() * object.transform.scale;
        bbox.orientation = view_rotation * object.transform.orientation;
        bbox.label = label;

        boxes.insert(object.id, bbox);
    }

    boxes
}

/// Map clip-space extents to pixel coordinates: clamp to [-1, 1],
/// rescale to the image dimensions (y flipped), truncate to whole
/// pixels and clip against the screen boundaries.
fn convert_to_screen_coord(min_vertex: &mut Vector3, max_vertex: &mut Vector3, width: u32, height: u32) {
    // clip the values outside the frustum range
    min_vertex.x = min_vertex.x.clamp(-1.0, 1.0);
    min_vertex.y = min_vertex.y.clamp(-1.0, 1.0);
    max_vertex.x = max_vertex.x.clamp(-1.0, 1.0);
    max_vertex.y = max_vertex.y.clamp(-1.0, 1.0);

    // convert from [-1, 1] range to [0, 1] range & multiply by screen dims
    min_vertex.x = ((min_vertex.x + 1.0) / 2.0 * width as Float) as u32 as Float;
    min_vertex.y = ((1.0 - min_vertex.y) / 2.0 * height as Float) as u32 as Float;
    max_vertex.x = ((max_vertex.x + 1.0) / 2.0 * width as Float) as u32 as Float;
    max_vertex.y = ((1.0 - max_vertex.y) / 2.0 * height as Float) as u32 as Float;

    // clip outside screen boundaries
    max_vertex.x = max_vertex.x.min((width - 1) as Float);
    max_vertex.y = max_vertex.y.min((height - 1) as Float);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idbuffer::{CHANNEL_COUNT, IdPalette};
    use crate::mesh::{Mesh, SubMesh, Transform};
    use crate::scene::ObjectRecord;

    const BACKGROUND: u32 = 255;

    /// Identity view and projection: clip space equals world space and
    /// the frustum is the [-1, 1] cube. Keeps the numbers readable.
    fn identity_camera() -> Camera {
        Camera::new(Matrix4::IDENTITY, Matrix4::IDENTITY, 0.1, 100.0)
    }

    fn cube_mesh(center: Vector3, half: Float) -> Mesh {
        let corners: Vec<Vector3> = crate::geometry::Aabb::new(
            center - Vector3::splat(half),
            center + Vector3::splat(half),
        )
        .corners()
        .to_vec();
        Mesh::new(vec![SubMesh::from_positions(&corners)])
    }

    #[test]
    fn test_visible_boxes_from_pixel_block() {
        let (width, height) = (200, 200);
        let palette = IdPalette::new(BACKGROUND);
        let mut buffer = vec![BACKGROUND as u8; (width * height) as usize * CHANNEL_COUNT];

        // 10x10 block of id 1 at (40, 40)..=(49, 49)
        for y in 40..50u32 {
            for x in 40..50u32 {
                let index = ((y * width + x) as usize) * CHANNEL_COUNT;
                buffer[index..index + 3].copy_from_slice(&palette.encode(1, 2));
            }
        }

        let (labels, boxes) = visible_boxes_2d(&buffer, width, height, BACKGROUND);
        assert_eq!(labels[&1], 2);

        let bbox = &boxes[&1];
        assert_eq!(bbox.box_type, BoundingBoxType::VisibleBox2D);
        assert_eq!(bbox.center, Vector3::new(44.0, 44.0, 0.0));
        assert_eq!(bbox.size, Vector3::new(9.0, 9.0, 0.0));
        assert_eq!(bbox.label, 2);
    }

    #[test]
    fn test_full_boxes_pixel_mapping() {
        let camera = identity_camera();
        let object = ObjectRecord::new(
            5,
            "model",
            Transform::IDENTITY,
            cube_mesh(Vector3::ZERO, 0.5),
        )
        .unwrap();
        let snapshot = SceneSnapshot::new(vec![object]);

        let visible = BTreeMap::from([(5u32, 9u32)]);
        let boxes = full_boxes_2d(&snapshot, &camera, &visible, 200, 200);

        let bbox = &boxes[&5];
        // ndc [-0.5, 0.5] maps to pixels [50, 150] on both axes
        assert_eq!(bbox.center, Vector3::new(100.0, 100.0, 0.0));
        assert_eq!(bbox.size, Vector3::new(100.0, 100.0, 0.0));
        assert_eq!(bbox.label, 9);
    }

    #[test]
    fn test_full_boxes_exclude_hidden_and_culled() {
        let camera = identity_camera();
        let in_view = ObjectRecord::new(
            1,
            "a",
            Transform::IDENTITY,
            cube_mesh(Vector3::ZERO, 0.5),
        )
        .unwrap();
        // Both x extremes beyond the clip range on the same side
        let off_screen = ObjectRecord::new(
            2,
            "b",
            Transform::IDENTITY,
            cube_mesh(Vector3::new(5.0, 0.0, 0.0), 0.5),
        )
        .unwrap();
        let snapshot = SceneSnapshot::new(vec![in_view, off_screen]);

        // Id 3 never contributed a pixel; id 2 did (say, a stale map)
        // but projects outside the clip range
        let visible = BTreeMap::from([(1u32, 1u32), (2u32, 2u32)]);
        let boxes = full_boxes_2d(&snapshot, &camera, &visible, 200, 200);

        assert!(boxes.contains_key(&1));
        assert!(!boxes.contains_key(&2));
        assert!(!boxes.contains_key(&3));
    }

    #[test]
    fn test_boxes_3d_compose_camera_rotation() {
        // Real perspective camera looking down -z from +z
        let camera = Camera::perspective(
            Vector3::new(0.0, 0.0, 10.0),
            Vector3::ZERO,
            Vector3::Y,
            60.0,
            1.0,
            0.1,
            100.0,
        );

        let spin = Quaternion::from_rotation_y(0.5);
        let transform = Transform {
            position: Vector3::new(1.0, 2.0, 0.0),
            orientation: spin,
            scale: Vector3::splat(3.0),
        };
        let object = ObjectRecord::new(7, "model", transform, cube_mesh(Vector3::ZERO, 0.5)).unwrap();
        let snapshot = SceneSnapshot::new(vec![object.clone()]);

        let visible = BTreeMap::from([(7u32, 4u32)]);
        let boxes = boxes_3d(&snapshot, &camera, &visible);
        let bbox = &boxes[&7];

        assert_eq!(bbox.box_type, BoundingBoxType::Box3D);
        assert_eq!(bbox.label, 4);
        // Local cube of size 1 scaled by 3
        assert!((bbox.size - Vector3::splat(3.0)).length() < 1e-9);
        // Center is the world AABB center seen from the camera
        let expected_center =
            transform_point(camera.view_matrix(), &object.world_aabb.center());
        assert!((bbox.center - expected_center).length() < 1e-9);
        // Orientation composes view rotation with the object's own
        let expected_orientation = camera.view_rotation() * spin;
        assert!(bbox.orientation.angle_between(expected_orientation) < 1e-9);
    }
}
