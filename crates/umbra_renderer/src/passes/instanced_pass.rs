/// Opaque instanced geometry pass.
///
/// Clears colour + depth, binds the scene constants and hands every
/// `DrawCommand` in the `FramePacket` to [`indirect::submit`].
use std::sync::Arc;

use wgpu::{
    Color, CommandEncoder, Device, LoadOp, Operations, Queue,
    RenderPassColorAttachment, RenderPassDepthStencilAttachment, RenderPassDescriptor,
    StoreOp, TextureView,
};

use crate::graph::{FramePacket, RenderPass};
use crate::indirect;
use crate::pipeline::InstancedPipeline;

pub struct InstancedPass {
    pipeline:         InstancedPipeline,
    scene_bind_group: Arc<wgpu::BindGroup>,
    pub clear_color:  Color,
}

impl InstancedPass {
    pub fn new(pipeline: InstancedPipeline, scene_bind_group: Arc<wgpu::BindGroup>, clear_color: Color) -> Self {
        Self {
            pipeline,
            scene_bind_group,
            clear_color,
        }
    }
}

impl RenderPass for InstancedPass {
    fn name(&self) -> &str { "Instanced Opaque Pass" }

    fn execute(
        &mut self,
        _device: &Device,
        _queue: &Queue,
        encoder: &mut CommandEncoder,
        color_view: &TextureView,
        depth_view: Option<&TextureView>,
        packet: &FramePacket,
    ) {
        let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some(self.name()),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: Operations {
                    load:  LoadOp::Clear(self.clear_color),
                    store: StoreOp::Store,
                },
            })],
            depth_stencil_attachment: depth_view.map(|v| RenderPassDepthStencilAttachment {
                view: v,
                depth_ops: Some(Operations {
                    load:  LoadOp::Clear(1.0),
                    store: StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes:    None,
        });

        rpass.set_pipeline(&self.pipeline.inner);
        rpass.set_bind_group(0, &*self.scene_bind_group, &[]);

        for cmd in &packet.draws {
            indirect::submit(&mut rpass, cmd);
        }
    }
}
