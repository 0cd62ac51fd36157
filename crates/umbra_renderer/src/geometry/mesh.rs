/// A drawable GPU mesh: vertex/index buffers, the index count and the
/// local-space bounding box every instance of the mesh inherits.
///
/// Meshes are cheaply cloneable because the underlying buffers are `Arc`-
/// wrapped.  Creating a second handle to a mesh does **not** copy GPU memory.
use std::sync::Arc;

use crate::scene::Aabb;

#[derive(Clone)]
pub struct Mesh {
    pub vertex_buffer: Arc<wgpu::Buffer>,
    pub index_buffer: Arc<wgpu::Buffer>,
    pub index_count: u32,
    /// Index format used when binding this mesh.
    pub index_format: wgpu::IndexFormat,
    pub bounds: Aabb,
}

impl Mesh {
    /// Convenience constructor: creates a unit cube centred at the origin.
    pub fn cube(device: &wgpu::Device) -> Self {
        super::primitives::cube(device)
    }
}
