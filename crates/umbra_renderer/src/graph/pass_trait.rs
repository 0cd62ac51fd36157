/// The `RenderPass` trait: every stage in the frame implements this.
///
/// ## Two-phase design
/// `prepare` → `execute` lets passes upload GPU data **before** opening a
/// `wgpu::RenderPass`, which is required because `write_buffer` is not allowed
/// while an encoder is recording a render pass.
use wgpu::{CommandEncoder, Device, Queue, TextureView};

use crate::graph::FramePacket;

pub trait RenderPass: Send + Sync + 'static {
    /// Short human-readable label used as the WGPU debug label.
    fn name(&self) -> &str;

    /// Called whenever the output dimensions change.
    #[allow(unused_variables)]
    fn on_resize(&mut self, device: &Device, queue: &Queue, width: u32, height: u32) {}

    /// Upload GPU data.  Called **before** `execute` each frame.
    #[allow(unused_variables)]
    fn prepare(&mut self, device: &Device, queue: &Queue, packet: &FramePacket) {}

    /// Record commands into `encoder`.
    ///
    /// - `color_view`: colour attachment
    /// - `depth_view`: depth attachment, or `None` for passes that skip depth
    fn execute(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_view: &TextureView,
        depth_view: Option<&TextureView>,
        packet: &FramePacket,
    );
}
