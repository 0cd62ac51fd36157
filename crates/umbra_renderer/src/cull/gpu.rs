//! Compute-shader culling feeding an indirect draw.
//!
//! Per frame, in one command encoder:
//! 1. reset the live indirect args from the seed (instance count 0);
//! 2. dispatch `cull.wgsl`, one invocation per active instance;
//! 3. copy the live args into the next free query ring slot.
//!
//! The render pass recorded afterwards draws with `draw_indexed_indirect`
//! from the same live args, so the count never leaves the GPU on the hot path.
use std::sync::Arc;

use crate::cull::{CullContext, Culler, InstanceSource, VisibleSet};
use crate::error::RendererError;
use crate::indirect::{DrawIndexedIndirectArgs, IndirectArgsBuffer};
use crate::pipeline::{ComputePipeline, PipelineLayouts, ShaderDefines, ShaderLibrary};
use crate::query_ring::{FrameQueryRing, ReadbackQuery};
use crate::resources::{buffer, InstanceBuffer};
use crate::scene::{Frustum, GpuAabb, InstanceStore, MAX_INSTANCES};

/// Must match `@workgroup_size` in `cull.wgsl`.
pub const WORKGROUP_SIZE: u32 = 64;

/// Uniform block of the cull shader (`CullParams` in `cull.wgsl`).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CullParams {
    pub planes: [[f32; 4]; 6],
    pub instance_count: u32,
    pub _pad: [u32; 3],
}

impl CullParams {
    pub fn new(frustum: &Frustum, instance_count: u32) -> Self {
        Self {
            planes: frustum.to_gpu(),
            instance_count,
            _pad: [0; 3],
        }
    }
}

/// Workgroups needed to give every one of `active` instances an invocation.
#[inline]
pub fn workgroup_count(active: usize) -> u32 {
    (active as u32).div_ceil(WORKGROUP_SIZE)
}

pub struct GpuCuller {
    pipeline: ComputePipeline,
    bind_group: wgpu::BindGroup,
    params: Arc<wgpu::Buffer>,
    bounds: Arc<wgpu::Buffer>,
    bounds_scratch: Vec<GpuAabb>,
    /// Compacted survivors, written by the shader and drawn from.
    visible: InstanceBuffer,
    args: IndirectArgsBuffer,
    ring: FrameQueryRing<ReadbackQuery>,
    /// Slot whose copy was recorded this frame, armed after submission.
    recorded: Option<usize>,
    index_count: u32,
}

impl GpuCuller {
    /// Builds the compute pipeline and its buffers.  `instances` is the
    /// shared full instance buffer the shader reads from.
    pub fn new(
        device: &wgpu::Device,
        layouts: &PipelineLayouts,
        instances: &InstanceBuffer,
        index_count: u32,
    ) -> Result<Self, RendererError> {
        let shader = ShaderLibrary::load(device, "cull", &ShaderDefines::new())?;
        let pipeline = ComputePipeline::new(device, &shader, &[&layouts.cull], "main", "Cull Pipeline")?;

        let params = buffer::create_uniform(device, "Cull Params", &CullParams::default());
        let bounds = buffer::create_storage(
            device,
            "Instance Bounds",
            (MAX_INSTANCES * std::mem::size_of::<GpuAabb>()) as wgpu::BufferAddress,
            wgpu::BufferUsages::empty(),
        );
        let visible = InstanceBuffer::new(
            device,
            &layouts.instances,
            "GPU Visible Instances",
            wgpu::BufferUsages::empty(),
        );
        let args = IndirectArgsBuffer::new(device, index_count);

        let bind_group = crate::error::validated(device, "cull bind group", || {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Cull Bind Group"),
                layout: &layouts.cull,
                entries: &[
                    wgpu::BindGroupEntry { binding: 0, resource: params.as_entire_binding() },
                    wgpu::BindGroupEntry { binding: 1, resource: instances.buffer.as_entire_binding() },
                    wgpu::BindGroupEntry { binding: 2, resource: bounds.as_entire_binding() },
                    wgpu::BindGroupEntry { binding: 3, resource: visible.buffer.as_entire_binding() },
                    wgpu::BindGroupEntry { binding: 4, resource: args.live.as_entire_binding() },
                ],
            })
        })?;

        let ring = FrameQueryRing::new(|i| ReadbackQuery::new(device, i));

        Ok(Self {
            pipeline,
            bind_group,
            params,
            bounds,
            bounds_scratch: Vec::with_capacity(MAX_INSTANCES),
            visible,
            args,
            ring,
            recorded: None,
            index_count,
        })
    }

    /// Arms the query slot recorded this frame.  Call right after the frame's
    /// command buffer has been submitted.
    pub fn after_submit(&mut self) {
        if let Some(slot) = self.recorded.take() {
            self.ring.commit(slot);
        }
    }

    /// Drops a recorded slot whose command buffer was never submitted.
    fn discard_recorded(&mut self) {
        if let Some(slot) = self.recorded.take() {
            self.ring.cancel(slot);
        }
    }

    /// Non-blocking drain of finished readbacks.  Returns the newest
    /// `(frame, visible)` completed by this call.
    pub fn poll_queries(&mut self) -> Option<(u64, u32)> {
        self.ring.poll_ready()
    }

    #[inline]
    pub fn ring(&self) -> &FrameQueryRing<ReadbackQuery> {
        &self.ring
    }

    /// Static fields every frame's args start from.
    #[inline]
    pub fn seed_args(&self) -> DrawIndexedIndirectArgs {
        self.args.seed_args()
    }
}

impl Culler for GpuCuller {
    fn on_activate(&mut self, queue: &wgpu::Queue) {
        self.args.reseed(queue, self.index_count);
    }

    fn cull(
        &mut self,
        ctx: &mut CullContext<'_>,
        store: &InstanceStore,
        frustum: &Frustum,
    ) -> VisibleSet {
        // a copy recorded by an earlier, unsubmitted call is abandoned
        self.discard_recorded();

        let active = store.active_count();
        ctx.instances.write(ctx.queue, store.records());
        self.bounds_scratch.clear();
        self.bounds_scratch.extend(store.bounds().iter().map(GpuAabb::from));
        if !self.bounds_scratch.is_empty() {
            ctx.queue
                .write_buffer(&self.bounds, 0, bytemuck::cast_slice(&self.bounds_scratch));
        }
        buffer::update_uniform(ctx.queue, &self.params, &CullParams::new(frustum, active as u32));

        self.args.record_reset(ctx.encoder);

        if active > 0 {
            let mut cpass = ctx.encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Cull Pass"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.pipeline.inner);
            cpass.set_bind_group(0, &self.bind_group, &[]);
            cpass.dispatch_workgroups(workgroup_count(active), 1, 1);
        }

        if let Some(slot) = self.ring.reserve(ctx.frame) {
            ctx.encoder.copy_buffer_to_buffer(
                &self.args.live,
                0,
                self.ring.query(slot).buffer(),
                0,
                DrawIndexedIndirectArgs::SIZE,
            );
            self.recorded = Some(slot);
        }

        VisibleSet {
            bind_group: self.visible.bind_group.clone(),
            instances: InstanceSource::Indirect {
                args: self.args.live.clone(),
                offset: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_match_wgsl_uniform_size() {
        assert_eq!(std::mem::size_of::<CullParams>(), 112);
        assert_eq!(std::mem::offset_of!(CullParams, instance_count), 96);
    }

    #[test]
    fn dispatch_rounds_up_to_whole_workgroups() {
        assert_eq!(workgroup_count(0), 0);
        assert_eq!(workgroup_count(1), 1);
        assert_eq!(workgroup_count(64), 1);
        assert_eq!(workgroup_count(65), 2);
        assert_eq!(workgroup_count(MAX_INSTANCES), 2);
    }
}
