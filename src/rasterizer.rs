/*

    Draw bounding box outlines into an RGB byte buffer for debugging
    and dataset previews. 2D boxes are four straight edge runs; 3D
    boxes are projected, clipped against the frustum rectangle and
    drawn as a wireframe.

    DISCLAIMER: Line drawing follows the integer Bresenham variants at
    https://en.wikipedia.org/wiki/Bresenham%27s_line_algorithm

    @date: 19 Nov, 2025
    @author: bartu
*/

use bevy_math::IVec2;

use crate::boxes::{BoundingBox, BoundingBoxType};
use crate::clipper::{ClipBounds, add_to_viewport_lines};
use crate::idbuffer::CHANNEL_COUNT;
use crate::prelude::*;

// Edges of the 3D box wireframe, indexing BoundingBox::vertices():
// the +z ring, the -z ring, then the four pillars.
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

// Plot one pixel, skipping anything off the image.
#[inline]
fn plot(data: &mut [u8], width: u32, height: u32, x: Int, y: Int) {
    if x < 0 || y < 0 || x >= width as Int || y >= height as Int {
        return;
    }
    let index = (y as usize * width as usize + x as usize) * CHANNEL_COUNT;
    data[index] = 0;
    data[index + 1] = 255;
    data[index + 2] = 0;
}

/// Integer Bresenham between two pixel positions, stepping along the
/// major axis so steep lines don't gap. The end pixel is exclusive.
/// Lines are always drawn in green.
pub fn draw_line(data: &mut [u8], width: u32, height: u32, point1: IVec2, point2: IVec2) {
    // Check if the line is close to a vertical or horizontal line
    if (point2.y - point1.y).abs() < (point2.x - point1.x).abs() {
        let (x0, y0, x1, y1) = if point1.x < point2.x {
            (point1.x, point1.y, point2.x, point2.y)
        } else {
            (point2.x, point2.y, point1.x, point1.y)
        };

        let dx = x1 - x0;
        let mut dy = y1 - y0;
        let mut yi = 1;
        if dy < 0 {
            yi = -1;
            dy = -dy;
        }
        let mut d = 2 * dy - dx;
        let mut y = y0;

        for x in x0..x1 {
            plot(data, width, height, x, y);
            if d > 0 {
                y += yi;
                d += 2 * (dy - dx);
            } else {
                d += 2 * dy;
            }
        }
    } else {
        let (x0, y0, x1, y1) = if point1.y < point2.y {
            (point1.x, point1.y, point2.x, point2.y)
        } else {
            (point2.x, point2.y, point1.x, point1.y)
        };

        let mut dx = x1 - x0;
        let dy = y1 - y0;
        let mut xi = 1;
        if dx < 0 {
            xi = -1;
            dx = -dx;
        }
        let mut d = 2 * dx - dy;
        let mut x = x0;

        for y in y0..y1 {
            plot(data, width, height, x, y);
            if d > 0 {
                x += xi;
                d += 2 * (dx - dy);
            } else {
                d += 2 * dx;
            }
        }
    }
}

/// Draw the outline of a box into an RGB image buffer of the given
/// dimensions. 3D boxes additionally need the camera projection to
/// land in pixel space; 2D boxes ignore it.
///
/// The color argument is accepted for API symmetry but currently
/// ignored; outlines are always green.
// TODO: wire the color argument through plot() instead of hardcoding green
pub fn draw_box(
    data: &mut [u8],
    width: u32,
    height: u32,
    projection: &Matrix4,
    _color: Vector3,
    bbox: &BoundingBox,
) {
    if bbox.box_type == BoundingBoxType::Box3D {
        draw_wireframe_3d(data, width, height, projection, bbox);
        return;
    }

    // 2D box: two vertical runs at the x extremes, two horizontal runs
    // at the y extremes
    let min_x = (bbox.center.x - bbox.size.x / 2.0) as u32;
    let max_x = (bbox.center.x + bbox.size.x / 2.0) as u32;
    let min_y = (bbox.center.y - bbox.size.y / 2.0) as u32;
    let max_y = (bbox.center.y + bbox.size.y / 2.0) as u32;

    for y in min_y..max_y {
        for x in [min_x, max_x] {
            plot(data, width, height, x as Int, y as Int);
        }
    }
    for y in [min_y, max_y] {
        for x in min_x..max_x {
            plot(data, width, height, x as Int, y as Int);
        }
    }
}

fn draw_wireframe_3d(
    data: &mut [u8],
    width: u32,
    height: u32,
    projection: &Matrix4,
    bbox: &BoundingBox,
) {
    // 3D corners in camera coordinates
    let vertices = bbox.vertices();

    let mut vertices_2d = Vec::with_capacity(vertices.len());
    for vertex in &vertices {
        // Skip boxes which have any vertex behind the camera
        // (positive z in camera coordinates)
        if vertex.z > 0.0 {
            return;
        }

        let clip = *projection * Vector4::new(vertex.x, vertex.y, vertex.z, 1.0);
        vertices_2d.push(Vector2::new(clip.x / clip.w, clip.y / clip.w));
    }

    // Clip the 12 edges to the [-1, 1] frustum rectangle
    let mut clipped = Vec::new();
    for (a, b) in BOX_EDGES {
        add_to_viewport_lines(&ClipBounds::UNIT, vertices_2d[a], vertices_2d[b], &mut clipped);
    }

    // Map surviving endpoints to pixel coordinates
    let endpoints: Vec<IVec2> = clipped
        .iter()
        .map(|v| {
            let x = ((v.x + 1.0) / 2.0 * width as Float) as u32;
            let y = ((1.0 - v.y) / 2.0 * height as Float) as u32;
            IVec2::new(x.min(width - 1) as i32, y.min(height - 1) as i32)
        })
        .collect();

    for pair in endpoints.chunks_exact(2) {
        draw_line(data, width, height, pair[0], pair[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: Vector3 = Vector3::new(0.0, 255.0, 0.0);

    fn green_at(data: &[u8], width: u32, x: u32, y: u32) -> u8 {
        data[((y * width + x) as usize) * CHANNEL_COUNT + 1]
    }

    #[test]
    fn test_draw_visible_2d_box_boundaries() {
        let (width, height) = (200u32, 200u32);
        let mut data = vec![0u8; (width * height) as usize * CHANNEL_COUNT];

        let mut bbox = BoundingBox::new(BoundingBoxType::VisibleBox2D);
        bbox.center = Vector3::new(125.0, 125.0, 0.0);
        bbox.size = Vector3::new(50.0, 50.0, 0.0);

        draw_box(&mut data, width, height, &Matrix4::IDENTITY, GREEN, &bbox);

        // Boundary pixels (minX, minY) = (100, 100), maxX/maxY = 150
        assert_eq!(green_at(&data, width, 100, 100), 255);
        assert_eq!(green_at(&data, width, 149, 150), 255); // bottom run, exclusive end
        assert_eq!(green_at(&data, width, 150, 149), 255); // right run, exclusive end
        assert_eq!(green_at(&data, width, 150, 100), 255);

        // The exclusive far corner stays untouched
        assert_eq!(green_at(&data, width, 150, 150), 0);
        // Interior stays untouched
        assert_eq!(green_at(&data, width, 125, 125), 0);

        // Red/blue channels stay zero on a drawn pixel
        let index = ((100 * width + 100) as usize) * CHANNEL_COUNT;
        assert_eq!(data[index], 0);
        assert_eq!(data[index + 2], 0);
    }

    #[test]
    fn test_draw_line_steep_has_no_gaps() {
        let (width, height) = (32u32, 32u32);
        let mut data = vec![0u8; (width * height) as usize * CHANNEL_COUNT];

        // Steeper than 45 degrees: major axis is y
        draw_line(&mut data, width, height, IVec2::new(3, 2), IVec2::new(7, 20));

        let mut drawn = 0;
        for y in 2..20 {
            let hit = (0..width).any(|x| green_at(&data, width, x, y) == 255);
            assert!(hit, "row {} has a gap", y);
            drawn += 1;
        }
        assert_eq!(drawn, 18);
    }

    #[test]
    fn test_draw_line_ignores_off_image_pixels() {
        let (width, height) = (16u32, 16u32);
        let mut data = vec![0u8; (width * height) as usize * CHANNEL_COUNT];

        // Runs off the right edge; must not panic and must paint the
        // in-bounds part
        draw_line(&mut data, width, height, IVec2::new(10, 5), IVec2::new(40, 5));
        assert_eq!(green_at(&data, width, 15, 5), 255);
    }

    #[test]
    fn test_draw_wireframe_3d_box() {
        let (width, height) = (200u32, 200u32);
        let mut data = vec![0u8; (width * height) as usize * CHANNEL_COUNT];

        // Identity projection: ndc equals camera x/y. Unit box one
        // unit in front of the camera, corners at ndc (+-0.5, +-0.5).
        let mut bbox = BoundingBox::new(BoundingBoxType::Box3D);
        bbox.center = Vector3::new(0.0, 0.0, -1.0);
        bbox.size = Vector3::new(1.0, 1.0, 0.5);

        draw_box(&mut data, width, height, &Matrix4::IDENTITY, GREEN, &bbox);

        // ndc y = 0.5 is pixel row 50, the top edge runs x 50..150
        assert_eq!(green_at(&data, width, 100, 50), 255);
        // ndc x = -0.5 is pixel column 50 on the left edge
        assert_eq!(green_at(&data, width, 50, 100), 255);
    }

    #[test]
    fn test_wireframe_rejected_behind_camera() {
        let (width, height) = (64u32, 64u32);
        let mut data = vec![0u8; (width * height) as usize * CHANNEL_COUNT];

        let mut bbox = BoundingBox::new(BoundingBoxType::Box3D);
        bbox.center = Vector3::new(0.0, 0.0, 1.0); // behind the camera
        bbox.size = Vector3::splat(1.0);

        draw_box(&mut data, width, height, &Matrix4::IDENTITY, GREEN, &bbox);
        assert!(data.iter().all(|&byte| byte == 0));
    }
}
