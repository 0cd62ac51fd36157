/// The instanced cube pipeline.
///
/// Vertices come from the mesh buffer; per-instance data is fetched from a
/// storage buffer by `instance_index`, so the same pipeline draws the full
/// instance set, the CPU survivors or the GPU-compacted list.
use std::sync::Arc;

use crate::error::{validated, RendererError};
use crate::geometry::Vertex;
use crate::pipeline::shader::LoadedShader;
use crate::pipeline::PipelineLayouts;
use crate::render_target::DepthTarget;

#[derive(Clone)]
pub struct InstancedPipeline {
    pub inner: Arc<wgpu::RenderPipeline>,
}

impl InstancedPipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &LoadedShader,
        target_format: wgpu::TextureFormat,
        layouts: &PipelineLayouts,
    ) -> Result<Self, RendererError> {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Instanced Pipeline Layout"),
            bind_group_layouts: &[&layouts.scene, &layouts.instances],
            push_constant_ranges: &[],
        });

        let pipeline = validated(device, "instanced pipeline", || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Instanced Render Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader.module,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout()],
                    compilation_options: shader.compilation_options(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader.module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: target_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: shader.compilation_options(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DepthTarget::FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        })?;

        Ok(Self {
            inner: Arc::new(pipeline),
        })
    }
}
