/// Data bundle assembled once per frame and passed immutably to every
/// `RenderPass`.
///
/// Building a `FramePacket` on the CPU side decouples culling from the GPU
/// passes: passes only see resolved draw descriptors, not which culler
/// produced them.  The renderer keeps one packet alive and refills it each
/// frame, so the draw list keeps its allocation.
use std::sync::Arc;

use crate::cull::InstanceSource;

/// One instanced mesh draw, fully resolved to GPU handles.
///
/// Everything the draw needs is in here; [`crate::indirect::submit`] sets no
/// state beyond what the descriptor names.
#[derive(Clone)]
pub struct DrawCommand {
    pub vertex_buffer: Arc<wgpu::Buffer>,
    pub index_buffer:  Arc<wgpu::Buffer>,
    pub index_count:   u32,
    pub index_format:  wgpu::IndexFormat,
    /// Instance records (group 1).
    pub instance_bind_group: Arc<wgpu::BindGroup>,
    pub instances: InstanceSource,
}

/// All data a `RenderPass` may need for one frame.
#[derive(Default)]
pub struct FramePacket {
    pub draws: Vec<DrawCommand>,
}

impl FramePacket {
    /// Drops last frame's draws, keeping the capacity.
    pub fn reset(&mut self) {
        self.draws.clear();
    }
}
