/*

    Read-only snapshot of the renderable objects in a frame, as handed
    over by the rendering side. The box pipeline never mutates these;
    it only streams vertices and reads transforms / extents.

    @date: 16 Nov, 2025
    @author: bartu
*/

use std::collections::BTreeMap;

use crate::geometry::Aabb;
use crate::mesh::{Mesh, Transform};
use crate::prelude::*;

/// One renderable mesh instance. The id matches the id encoded into
/// the id buffer for this object; parent_name groups the parts of a
/// multi-part model.
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    pub id: u32,
    pub parent_name: String,
    pub transform: Transform,
    pub mesh: Mesh,
    pub local_aabb: Aabb,
    pub world_aabb: Aabb,
}

impl ObjectRecord {
    /// Build a record, deriving the local and world extents from the
    /// mesh. Returns None when the mesh has no decodable vertices.
    pub fn new(id: u32, parent_name: impl Into<String>, transform: Transform, mesh: Mesh) -> Option<Self> {
        let Some(local_aabb) = mesh.local_aabb() else {
            warn!("Object {} has no decodable vertices, skipping record", id);
            return None;
        };
        let world_aabb = Aabb::from_points(local_aabb.corners().map(|c| transform.apply(c)))
            .expect("eight corners are never empty");

        Some(Self {
            id,
            parent_name: parent_name.into(),
            transform,
            mesh,
            local_aabb,
            world_aabb,
        })
    }
}

/// All renderables of one frame.
#[derive(Debug, Clone, Default)]
pub struct SceneSnapshot {
    pub objects: Vec<ObjectRecord>,
}

impl SceneSnapshot {
    pub fn new(objects: Vec<ObjectRecord>) -> Self {
        Self { objects }
    }

    pub fn find(&self, id: u32) -> Option<&ObjectRecord> {
        self.objects.iter().find(|object| object.id == id)
    }

    /// id -> parent name lookup (the grouping key for the merger).
    pub fn parent_names(&self) -> BTreeMap<u32, &str> {
        self.objects
            .iter()
            .map(|object| (object.id, object.parent_name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::SubMesh;

    #[test]
    fn test_record_derives_extents() {
        let mesh = Mesh::new(vec![SubMesh::from_positions(&[
            Vector3::new(-1.0, -1.0, -1.0),
            Vector3::new(1.0, 1.0, 1.0),
        ])]);
        let transform = Transform {
            position: Vector3::new(0.0, 0.0, -5.0),
            orientation: Quaternion::IDENTITY,
            scale: Vector3::splat(2.0),
        };

        let record = ObjectRecord::new(3, "model", transform, mesh).unwrap();
        assert_eq!(record.local_aabb.size(), Vector3::splat(2.0));
        assert_eq!(record.world_aabb.size(), Vector3::splat(4.0));
        assert_eq!(record.world_aabb.center(), Vector3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn test_empty_mesh_record_is_rejected() {
        assert!(ObjectRecord::new(1, "m", Transform::IDENTITY, Mesh::default()).is_none());
    }
}
