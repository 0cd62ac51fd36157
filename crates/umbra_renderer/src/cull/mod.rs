//! Visibility culling strategies.
//!
//! Every strategy consumes the same [`InstanceStore`] and [`Frustum`] and
//! produces a [`VisibleSet`]: the bind group the instanced pipeline reads
//! records from plus where the instance count comes from.  The draw path is
//! identical for all of them.

pub mod cpu;
pub mod gpu;

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::resources::InstanceBuffer;
use crate::scene::{Frustum, InstanceStore};

pub use cpu::CpuCuller;
pub use gpu::{CullParams, GpuCuller};

/// Which culler produces the visible set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CullMode {
    /// Draw every active instance.
    Disabled,
    /// Box test on the CPU, survivors uploaded each frame.
    Cpu,
    /// Box test in a compute pass feeding an indirect draw.
    #[default]
    Gpu,
}

impl CullMode {
    /// Next mode in the `Disabled → Cpu → Gpu → Disabled` cycle.
    pub fn next(self) -> Self {
        match self {
            CullMode::Disabled => CullMode::Cpu,
            CullMode::Cpu => CullMode::Gpu,
            CullMode::Gpu => CullMode::Disabled,
        }
    }
}

impl fmt::Display for CullMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CullMode::Disabled => "off",
            CullMode::Cpu => "cpu",
            CullMode::Gpu => "gpu",
        })
    }
}

/// Where the draw call takes its instance count from.
#[derive(Clone, Debug)]
pub enum InstanceSource {
    /// Count known on the CPU at record time.
    Direct { count: u32 },
    /// Count read by the GPU from a `DrawIndexedIndirectArgs` record.
    Indirect {
        args: Arc<wgpu::Buffer>,
        offset: wgpu::BufferAddress,
    },
}

/// Result of one frame's culling.  Valid for the frame it was produced in.
#[derive(Clone, Debug)]
pub struct VisibleSet {
    /// group(1) of the instanced pipeline: read-only storage of records.
    pub bind_group: Arc<wgpu::BindGroup>,
    pub instances: InstanceSource,
}

/// GPU handles a culler may record work into for the current frame.
pub struct CullContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// All active records, already current for this frame.
    pub instances: &'a InstanceBuffer,
    /// Monotonic frame id, used to tag completion queries.
    pub frame: u64,
}

/// A culling strategy.
pub trait Culler {
    /// Called when the renderer switches to this culler.
    #[allow(unused_variables)]
    fn on_activate(&mut self, queue: &wgpu::Queue) {}

    fn cull(
        &mut self,
        ctx: &mut CullContext<'_>,
        store: &InstanceStore,
        frustum: &Frustum,
    ) -> VisibleSet;
}

/// Draws every active instance straight from the shared instance buffer.
pub struct PassThroughCuller;

impl Culler for PassThroughCuller {
    fn cull(
        &mut self,
        ctx: &mut CullContext<'_>,
        store: &InstanceStore,
        _frustum: &Frustum,
    ) -> VisibleSet {
        VisibleSet {
            bind_group: ctx.instances.bind_group.clone(),
            instances: InstanceSource::Direct {
                count: store.active_count() as u32,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_cycle_visits_every_mode() {
        let start = CullMode::Disabled;
        assert_eq!(start.next(), CullMode::Cpu);
        assert_eq!(start.next().next(), CullMode::Gpu);
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn gpu_is_the_default_mode() {
        assert_eq!(CullMode::default(), CullMode::Gpu);
        assert_eq!(CullMode::Gpu.to_string(), "gpu");
    }
}
