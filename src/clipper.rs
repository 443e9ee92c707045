/*

    Clip line segments against a rectangular viewport with the
    Cohen-Sutherland algorithm. Used by the debug rasterizer to cut
    the wireframe edges of 3D boxes down to the visible frustum
    rectangle before they are mapped to pixels.

    DISCLAIMER: The clipping loop follows
    https://en.wikipedia.org/wiki/Cohen%E2%80%93Sutherland_algorithm

    @date: 13 Nov, 2025
    @author: bartu
*/

use bitflags::bitflags;

use crate::prelude::*;

bitflags! {
    /// Location of a point relative to the viewport rectangle.
    ///
    /// LEFT/RIGHT and BOTTOM/TOP are mutually exclusive pairs, so a
    /// code is at most one horizontal bit ORed with one vertical bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LocationCode: u8 {
        const INSIDE = 0;
        const LEFT = 1;
        const RIGHT = 2;
        const BOTTOM = 4;
        const TOP = 8;
    }
}

/// Rectangular clip region, xmin/ymin is the lower left corner.
#[derive(Debug, Clone, Copy)]
pub struct ClipBounds {
    pub xmin: Float,
    pub ymin: Float,
    pub xmax: Float,
    pub ymax: Float,
}

impl ClipBounds {
    pub const fn new(xmin: Float, ymin: Float, xmax: Float, ymax: Float) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// The normalized device region [-1, 1] x [-1, 1].
    pub const UNIT: Self = Self::new(-1.0, -1.0, 1.0, 1.0);
}

/// Determine where a point is relative to the viewport bounds.
pub fn location_code(bounds: &ClipBounds, x: Float, y: Float) -> LocationCode {
    let mut location = LocationCode::INSIDE;

    // to the left
    if x < bounds.xmin {
        location |= LocationCode::LEFT;
    }
    // to the right
    else if x > bounds.xmax {
        location |= LocationCode::RIGHT;
    }

    // below
    if y < bounds.ymin {
        location |= LocationCode::BOTTOM;
    }
    // above
    else if y > bounds.ymax {
        location |= LocationCode::TOP;
    }

    location
}

/// Clip the segment p0-p1 to the bounds. Returns the clipped endpoints
/// (first for p0, second for p1), or None when the segment lies fully
/// outside the bounds.
pub fn clip_segment(
    bounds: &ClipBounds,
    p0: Vector2,
    p1: Vector2,
) -> Option<(Vector2, Vector2)> {
    let (mut x0, mut y0) = (p0.x, p0.y);
    let (mut x1, mut y1) = (p1.x, p1.y);

    let mut location0 = location_code(bounds, x0, y0);
    let mut location1 = location_code(bounds, x1, y1);

    loop {
        if (location0 | location1).is_empty() {
            // Both endpoints are inside the bounds
            return Some((Vector2::new(x0, y0), Vector2::new(x1, y1)));
        }
        if !(location0 & location1).is_empty() {
            // Both points share an outside zone (left, right, top or
            // bottom), so the segment cannot cross the window
            return None;
        }

        // At least one endpoint is outside the clip rectangle; pick it
        let outer = if location1.bits() > location0.bits() {
            location1
        } else {
            location0
        };

        // Find the intersection point. Using:
        //    slope = (y1 - y0) / (x1 - x0)
        //    x = x0 + (1 / slope) * (ym - y0), where ym is ymin or ymax
        //    y = y0 + slope * (xm - x0), where xm is xmin or xmax
        // Divide by zero won't happen because the tested bit of outer
        // guarantees the denominator is non-zero.
        let (x, y) = if outer.contains(LocationCode::TOP) {
            (
                x0 + (x1 - x0) * (bounds.ymax - y0) / (y1 - y0),
                bounds.ymax,
            )
        } else if outer.contains(LocationCode::BOTTOM) {
            (
                x0 + (x1 - x0) * (bounds.ymin - y0) / (y1 - y0),
                bounds.ymin,
            )
        } else if outer.contains(LocationCode::RIGHT) {
            (
                bounds.xmax,
                y0 + (y1 - y0) * (bounds.xmax - x0) / (x1 - x0),
            )
        } else if outer.contains(LocationCode::LEFT) {
            (
                bounds.xmin,
                y0 + (y1 - y0) * (bounds.xmin - x0) / (x1 - x0),
            )
        } else {
            // The loop is still running, so some endpoint must be
            // outside; reaching this arm is a logic error.
            error!("Internal error: no point was found outside of the clip window");
            return None;
        };

        // Move the outside point to the intersection and reclassify
        if outer == location0 {
            x0 = x;
            y0 = y;
            location0 = location_code(bounds, x0, y0);
        } else {
            x1 = x;
            y1 = y;
            location1 = location_code(bounds, x1, y1);
        }
    }
}

/// Clip p0-p1 and append the surviving endpoints to `lines`. Segments
/// that miss the bounds entirely are not appended.
pub fn add_to_viewport_lines(
    bounds: &ClipBounds,
    p0: Vector2,
    p1: Vector2,
    lines: &mut Vec<Vector2>,
) {
    if let Some((q0, q1)) = clip_segment(bounds, p0, p1) {
        lines.push(q0);
        lines.push(q1);
    }
}
