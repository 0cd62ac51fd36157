/// Fixed-capacity storage buffer of [`InstanceRecord`]s.
///
/// The instanced vertex shader indexes this buffer with `@builtin(instance_index)`.
/// Three of these exist at runtime: the full set of active instances, the
/// CPU culler's survivors, and the GPU culler's compacted output.  All share
/// one bind-group layout, so the draw path does not care which one it binds.
///
/// Capacity never changes after creation, so the bind group stays valid for
/// the lifetime of the buffer.
use std::sync::Arc;

use crate::resources::buffer;
use crate::scene::{InstanceRecord, MAX_INSTANCES};

pub const RECORD_SIZE: wgpu::BufferAddress = std::mem::size_of::<InstanceRecord>() as wgpu::BufferAddress;

pub struct InstanceBuffer {
    pub buffer: Arc<wgpu::Buffer>,
    /// group(1) of the instanced pipeline.
    pub bind_group: Arc<wgpu::BindGroup>,
    capacity: usize,
}

impl InstanceBuffer {
    /// Allocates room for [`MAX_INSTANCES`] records.
    ///
    /// `layout` must be the instance bind-group layout (one read-only storage
    /// buffer at binding 0).
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        extra_usage: wgpu::BufferUsages,
    ) -> Self {
        let capacity = MAX_INSTANCES;
        let buf = buffer::create_storage(device, label, capacity as u64 * RECORD_SIZE, extra_usage);
        let bind_group = Arc::new(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buf.as_entire_binding(),
            }],
        }));
        Self {
            buffer: buf,
            bind_group,
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Uploads `records` starting at slot 0.  Excess records beyond capacity
    /// are dropped with a warning.
    pub fn write(&self, queue: &wgpu::Queue, records: &[InstanceRecord]) {
        let records = if records.len() > self.capacity {
            log::warn!(
                "instance upload of {} records truncated to {}",
                records.len(),
                self.capacity
            );
            &records[..self.capacity]
        } else {
            records
        };
        if !records.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(records));
        }
    }
}
