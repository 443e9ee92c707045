/*

    Mesh vertex access for the box pipeline. A mesh is a list of
    sub-mesh position streams in whatever encoding the renderer kept
    them in (4-component half floats or 3-component floats, little
    endian). Decoding is lazy; the pipeline only ever streams over
    the positions once per frame.

    @date: Oct-Nov 2025
    @author: Bartu

*/

use crate::geometry::Aabb;
use crate::prelude::*;

/// Encoding of one vertex position stream. Other(..) carries the raw
/// type tag of an encoding this crate does not understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Half4,
    Float3,
    Other(u32),
}

impl VertexFormat {
    fn stride(&self) -> Option<usize> {
        match self {
            VertexFormat::Half4 => Some(8),
            VertexFormat::Float3 => Some(12),
            VertexFormat::Other(_) => None,
        }
    }
}

/// World transform of a renderable, as derived from its scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3,
    pub orientation: Quaternion,
    pub scale: Vector3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vector3::ZERO,
        orientation: Quaternion::IDENTITY,
        scale: Vector3::ONE,
    };

    /// Local position to world position.
    #[inline]
    pub fn apply(&self, v: Vector3) -> Vector3 {
        self.orientation * (v * self.scale) + self.position
    }
}

/// One vertex-position stream of a mesh.
#[derive(Debug, Clone, Default)]
pub struct SubMesh {
    pub format: VertexFormat,
    pub data: Vec<u8>,
}

impl Default for VertexFormat {
    fn default() -> Self {
        VertexFormat::Float3
    }
}

impl SubMesh {
    pub fn new(format: VertexFormat, data: Vec<u8>) -> Self {
        if let Some(stride) = format.stride() {
            if data.len() % stride != 0 {
                warn!(
                    "Sub-mesh data length {} is not a multiple of the vertex stride {}",
                    data.len(),
                    stride
                );
            }
        }
        Self { format, data }
    }

    /// Build a float3 stream from plain positions (demo/test helper).
    pub fn from_positions(positions: &[Vector3]) -> Self {
        let mut data = Vec::with_capacity(positions.len() * 12);
        for p in positions {
            data.extend_from_slice(&(p.x as f32).to_le_bytes());
            data.extend_from_slice(&(p.y as f32).to_le_bytes());
            data.extend_from_slice(&(p.z as f32).to_le_bytes());
        }
        Self::new(VertexFormat::Float3, data)
    }

    pub fn vertex_count(&self) -> usize {
        match self.format.stride() {
            Some(stride) => self.data.len() / stride,
            None => 0,
        }
    }

    /// Lazily decoded local-space positions. An unsupported encoding
    /// is reported and yields an empty stream, so the owning object is
    /// skipped without failing the frame.
    pub fn positions(&self) -> impl Iterator<Item = Vector3> + '_ {
        let format = self.format;
        let (stride, data): (usize, &[u8]) = match format.stride() {
            Some(stride) => (stride, self.data.as_slice()),
            None => {
                error!("Vertex buffer type error: unsupported encoding {:?}", format);
                (1, &[])
            }
        };

        data.chunks_exact(stride).map(move |chunk| match format {
            VertexFormat::Half4 => {
                // Positions are the first 3 of the 4 half components
                let x = half_to_float(u16::from_le_bytes([chunk[0], chunk[1]]));
                let y = half_to_float(u16::from_le_bytes([chunk[2], chunk[3]]));
                let z = half_to_float(u16::from_le_bytes([chunk[4], chunk[5]]));
                Vector3::new(x as Float, y as Float, z as Float)
            }
            VertexFormat::Float3 => {
                let x = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                let y = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
                let z = f32::from_le_bytes([chunk[8], chunk[9], chunk[10], chunk[11]]);
                Vector3::new(x as Float, y as Float, z as Float)
            }
            // Unsupported formats produced the empty slice above, so
            // this arm never runs
            VertexFormat::Other(_) => Vector3::ZERO,
        })
    }
}

/// All position streams of one renderable.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub submeshes: Vec<SubMesh>,
}

impl Mesh {
    pub fn new(submeshes: Vec<SubMesh>) -> Self {
        Self { submeshes }
    }

    /// Local-space positions over all sub-meshes.
    pub fn positions(&self) -> impl Iterator<Item = Vector3> + '_ {
        self.submeshes.iter().flat_map(|sub| sub.positions())
    }

    pub fn local_aabb(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions())
    }

    /// Positions transformed to camera view coordinates (no projection).
    /// Used for the 3D multi-part merge.
    pub fn view_positions<'a>(
        &'a self,
        transform: &'a Transform,
        view: &'a Matrix4,
    ) -> impl Iterator<Item = Vector3> + 'a {
        self.positions()
            .map(move |v| transform_point(view, &transform.apply(v)))
    }

    /// Min/max corners of the mesh in clip space: x and y are divided
    /// by w, z is kept linear. Extents start from integer sentinels so
    /// an empty mesh comes back inverted (and gets culled downstream).
    pub fn screen_extents(
        &self,
        transform: &Transform,
        view: &Matrix4,
        proj: &Matrix4,
    ) -> (Vector3, Vector3) {
        let mut min_vertex = Vector3::splat(i32::MAX as Float);
        let mut max_vertex = Vector3::splat(i32::MIN as Float);

        let clip_matrix = *proj * *view;
        for v in self.positions() {
            let world = transform.apply(v);
            let clip = clip_matrix * Vector4::new(world.x, world.y, world.z, 1.0);

            // homogeneous division on x/y only
            let projected = Vector3::new(clip.x / clip.w, clip.y / clip.w, clip.z);

            min_vertex = min_vertex.min(projected);
            max_vertex = max_vertex.max(projected);
        }

        (min_vertex, max_vertex)
    }
}

/// Full-2D culling rule: an object is dropped only when both extremes
/// sit outside the [-1, 1] clip range on the same axis. An object
/// straddling the boundary is kept even if one extreme is far out.
pub fn extents_outside_frustum(min_vertex: &Vector3, max_vertex: &Vector3) -> bool {
    (min_vertex.x.abs() > 1.0 && max_vertex.x.abs() > 1.0)
        || (min_vertex.y.abs() > 1.0 && max_vertex.y.abs() > 1.0)
}
