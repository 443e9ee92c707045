/*

    BoundingBox data type shared by the whole pipeline:
    2D boxes live in pixel coordinates, 3D boxes in camera
    coordinates with an orientation.

    @date: 12 Nov, 2025
    @author: bartu
*/

use crate::prelude::*;

/// Which kind of box the camera reports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum BoundingBoxType {
    /// 2D box that shows the full box of occluded objects
    #[serde(rename = "full_2d")]
    FullBox2D,

    /// 2D box that shows only the visible part of an occluded object
    #[default]
    #[serde(rename = "visible_2d")]
    VisibleBox2D,

    /// 3D oriented box
    #[serde(rename = "3d")]
    Box3D,
}

/// 2D or 3D bounding box. Stores the position / orientation / size
/// of the box and the label of the annotated object inside it.
///
/// For the 2D types, center and size are in pixel coordinates with
/// z = 0 and the orientation unused. For Box3D they are in camera
/// coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub box_type: BoundingBoxType,
    pub center: Vector3,
    pub size: Vector3,
    pub orientation: Quaternion,
    pub label: u32,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            box_type: BoundingBoxType::default(),
            center: Vector3::ZERO,
            size: Vector3::ZERO,
            orientation: Quaternion::IDENTITY,
            label: 0,
        }
    }
}

impl BoundingBox {
    pub fn new(box_type: BoundingBoxType) -> Self {
        Self {
            box_type,
            ..Self::default()
        }
    }

    /// Corner vertices of a 3D box in camera coordinates. Non-3D boxes
    /// return an empty vector.
    ///
    /// Ordering (w, h, l are the half extents along x, y, z before the
    /// box rotation is applied):
    ///
    ///     1 -------- 0
    ///     /|         /|
    ///   2 -------- 3 .
    ///   | |        | |
    ///   . 5 -------- 4
    ///   |/         |/
    ///   6 -------- 7
    ///
    /// so 0..4 is the +z ring, 4..8 the -z ring, and vertex i sits
    /// straight above vertex i + 4.
    pub fn vertices(&self) -> Vec<Vector3> {
        if self.box_type != BoundingBoxType::Box3D {
            return vec![];
        }

        let w = self.size.x / 2.0;
        let h = self.size.y / 2.0;
        let l = self.size.z / 2.0;

        let corners = [
            Vector3::new(w, h, l),
            Vector3::new(-w, h, l),
            Vector3::new(-w, -h, l),
            Vector3::new(w, -h, l),
            Vector3::new(w, h, -l),
            Vector3::new(-w, h, -l),
            Vector3::new(-w, -h, -l),
            Vector3::new(w, -h, -l),
        ];

        corners
            .iter()
            .map(|corner| self.orientation * *corner + self.center)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices_empty_for_2d() {
        let box2d = BoundingBox::new(BoundingBoxType::VisibleBox2D);
        assert!(box2d.vertices().is_empty());
    }

    #[test]
    fn test_vertices_axis_aligned() {
        let mut box3d = BoundingBox::new(BoundingBoxType::Box3D);
        box3d.center = Vector3::new(1.0, 2.0, 3.0);
        box3d.size = Vector3::new(2.0, 4.0, 6.0);

        let verts = box3d.vertices();
        assert_eq!(verts.len(), 8);
        assert_eq!(verts[0], Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(verts[6], Vector3::new(0.0, 0.0, 0.0));

        // Pillar edges connect i to i + 4 along z
        for i in 0..4 {
            let pillar = verts[i] - verts[i + 4];
            assert_eq!(pillar, Vector3::new(0.0, 0.0, 6.0));
        }
    }
}
