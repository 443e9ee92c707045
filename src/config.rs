/*

    Declare the JSON scene description consumed by the demo binary and
    its conversion into the snapshot / camera structs the pipeline
    runs on. Objects are cuboids; their dimensions go into the node
    scale over a unit-cube mesh, the way a renderer would instance a
    shared box mesh.

    @date: 22 Nov, 2025
    @author: Bartu
*/

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use bevy_math::EulerRot;

use crate::boxes::BoundingBoxType;
use crate::camera::Camera;
use crate::geometry::Aabb;
use crate::mesh::{Mesh, SubMesh, Transform};
use crate::prelude::*;
use crate::scene::{ObjectRecord, SceneSnapshot};

#[derive(Debug, Deserialize, Clone, SmartDefault)]
#[serde(default)]
pub struct CameraConfig {
    #[default(Vector3::new(0.0, 0.0, 10.0))]
    pub position: Vector3,

    #[default(Vector3::ZERO)]
    pub look_at: Vector3,

    #[default(Vector3::Y)]
    pub up: Vector3,

    /// Vertical field of view in degrees
    #[default = 60.0]
    pub fovy: Float,

    #[default = 0.1]
    pub near: Float,

    #[default = 100.0]
    pub far: Float,

    #[default = 800]
    pub image_width: u32,

    #[default = 600]
    pub image_height: u32,
}

#[derive(Debug, Deserialize, Clone, SmartDefault)]
#[serde(default)]
pub struct ObjectConfig {
    pub name: String,

    /// Grouping key for multi-part models. Defaults to the object's
    /// own name (a single-part model).
    pub parent: String,

    #[default = 1]
    pub label: u32,

    pub position: Vector3,

    /// Euler rotation in degrees, applied x then y then z
    pub rotation: Vector3,

    /// Cuboid dimensions
    #[default(Vector3::ONE)]
    pub size: Vector3,
}

#[derive(Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,

    pub box_type: BoundingBoxType,

    /// Reserved label value for empty pixels; must not collide with
    /// any object label.
    #[default = 255]
    pub background_label: u32,

    pub objects: Vec<ObjectConfig>,
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::open(path)?;
        let config: SceneConfig = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn camera(&self) -> Camera {
        let aspect = self.camera.image_width as Float / self.camera.image_height as Float;
        Camera::perspective(
            self.camera.position,
            self.camera.look_at,
            self.camera.up,
            self.camera.fovy,
            aspect,
            self.camera.near,
            self.camera.far,
        )
    }

    /// Build the per-frame snapshot: object ids are assigned in file
    /// order starting at 1 (0 is easy to confuse with cleared memory).
    /// Also returns the id -> label assignment for the id pass.
    pub fn snapshot(&self) -> (SceneSnapshot, BTreeMap<u32, u32>) {
        let unit_cube: Vec<Vector3> = Aabb::new(Vector3::splat(-0.5), Vector3::splat(0.5))
            .corners()
            .to_vec();

        let mut objects = Vec::with_capacity(self.objects.len());
        let mut labels = BTreeMap::new();

        for (index, object) in self.objects.iter().enumerate() {
            let id = index as u32 + 1;

            let rotation = object.rotation;
            let transform = Transform {
                position: object.position,
                orientation: Quaternion::from_euler(
                    EulerRot::XYZ,
                    rotation.x.to_radians(),
                    rotation.y.to_radians(),
                    rotation.z.to_radians(),
                ),
                scale: object.size,
            };

            let parent = if object.parent.is_empty() {
                object.name.clone()
            } else {
                object.parent.clone()
            };

            let mesh = Mesh::new(vec![SubMesh::from_positions(&unit_cube)]);
            match ObjectRecord::new(id, parent, transform, mesh) {
                Some(record) => {
                    labels.insert(id, object.label);
                    objects.push(record);
                }
                None => warn!("Object '{}' produced no record", object.name),
            }
        }

        (SceneSnapshot::new(objects), labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_snapshot() {
        let config: SceneConfig = serde_json::from_str(
            r#"{
                "box_type": "full_2d",
                "objects": [
                    {"name": "base", "parent": "robot", "label": 3, "position": [0, 0, -5]},
                    {"name": "arm", "parent": "robot", "label": 3, "position": [0, 1, -5], "size": [0.2, 2.0, 0.2]},
                    {"name": "crate", "label": 4, "position": [3, 0, -6]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.box_type, BoundingBoxType::FullBox2D);
        assert_eq!(config.background_label, 255);
        assert_eq!(config.camera.image_width, 800);

        let (snapshot, labels) = config.snapshot();
        assert_eq!(snapshot.objects.len(), 3);
        assert_eq!(labels[&1], 3);
        assert_eq!(labels[&3], 4);

        // Ids are 1-based in file order; unset parent falls back to
        // the object's own name
        assert_eq!(snapshot.objects[0].parent_name, "robot");
        assert_eq!(snapshot.objects[2].parent_name, "crate");
        assert_eq!(snapshot.objects[2].id, 3);

        // The arm cuboid dims land in the node scale
        assert_eq!(snapshot.objects[1].transform.scale, Vector3::new(0.2, 2.0, 0.2));
        assert_eq!(snapshot.objects[1].local_aabb.size(), Vector3::ONE);
    }
}
