/// Shared `wgpu::BindGroupLayout` objects that are used by multiple pipeline
/// stages.  Centralising them here means every buffer that feeds, for
/// example, the instance slot can be bound with the *same* layout.
use std::sync::Arc;

/// All bind-group layouts used by the built-in pipelines.
///
/// Layouts are created once and shared via `Arc` so individual passes and
/// cullers can hold a reference without owning the whole struct.
#[derive(Clone)]
pub struct PipelineLayouts {
    /// Render group(0): scene uniform (camera + light), vertex and fragment.
    pub scene: Arc<wgpu::BindGroupLayout>,
    /// Render group(1): read-only storage array of instance records.
    ///
    /// The full instance buffer, the CPU survivors and the GPU-compacted
    /// output all bind through this layout.
    pub instances: Arc<wgpu::BindGroupLayout>,
    /// Compute group(0) of the cull shader.
    pub cull: Arc<wgpu::BindGroupLayout>,
}

fn storage(binding: u32, visibility: wgpu::ShaderStages, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl PipelineLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let scene = Arc::new(device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("Layout: Scene"),
                entries: &[uniform(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
            },
        ));

        let instances = Arc::new(device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("Layout: Instances"),
                entries: &[storage(0, wgpu::ShaderStages::VERTEX, true)],
            },
        ));

        let compute = wgpu::ShaderStages::COMPUTE;
        let cull = Arc::new(device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("Layout: Cull"),
                entries: &[
                    uniform(0, compute),        // params
                    storage(1, compute, true),  // all instances
                    storage(2, compute, true),  // local bounds
                    storage(3, compute, false), // compacted visible instances
                    storage(4, compute, false), // indirect args
                ],
            },
        ));

        Self { scene, instances, cull }
    }
}
