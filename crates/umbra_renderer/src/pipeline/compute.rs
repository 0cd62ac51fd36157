use std::sync::Arc;

use crate::error::{validated, RendererError};
use crate::pipeline::shader::LoadedShader;

/// A thin wrapper for a WGPU compute pipeline.
///
/// Pipeline creation runs inside a validation error scope, so a shader that
/// does not match its bind-group layouts fails here instead of at dispatch.
#[derive(Clone)]
pub struct ComputePipeline {
    pub inner: Arc<wgpu::ComputePipeline>,
}

impl ComputePipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &LoadedShader,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        entry_point: &str,
        label: &str,
    ) -> Result<Self, RendererError> {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label}_layout")),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        let pipeline = validated(device, label, || {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module: &shader.module,
                entry_point: Some(entry_point),
                compilation_options: shader.compilation_options(),
                cache: None,
            })
        })?;

        Ok(Self {
            inner: Arc::new(pipeline),
        })
    }
}
