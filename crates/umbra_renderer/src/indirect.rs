//! Indirect draw arguments and the single draw-submission entry point.
//!
//! The GPU path keeps two argument buffers.  The *seed* holds the static
//! fields (index count, first index, base vertex) with an instance count of
//! zero and is only written on the CPU.  Each frame the seed is copied over
//! the *live* buffer inside the command stream, then the cull shader bumps
//! the live instance count atomically and the draw reads it in place.
use std::sync::Arc;

use crate::cull::InstanceSource;
use crate::graph::DrawCommand;
use crate::resources::buffer;

/// Mirrors wgpu's `draw_indexed_indirect` argument layout (and `DrawArgs`
/// in `cull.wgsl`).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawIndexedIndirectArgs {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub first_instance: u32,
}

impl DrawIndexedIndirectArgs {
    pub const SIZE: wgpu::BufferAddress = std::mem::size_of::<Self>() as wgpu::BufferAddress;

    /// Static fields for drawing `index_count` indices, no instances yet.
    pub fn seed(index_count: u32) -> Self {
        Self {
            index_count,
            ..Self::default()
        }
    }

    /// True when everything but the instance count matches `other`.
    pub fn same_static_fields(&self, other: &Self) -> bool {
        self.index_count == other.index_count
            && self.first_index == other.first_index
            && self.base_vertex == other.base_vertex
            && self.first_instance == other.first_instance
    }

    /// Reads the record back from raw mapped bytes.  Returns `None` for a
    /// slice of the wrong size.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        bytemuck::try_pod_read_unaligned(bytes).ok()
    }
}

pub struct IndirectArgsBuffer {
    seed: Arc<wgpu::Buffer>,
    /// Read by `draw_indexed_indirect`, written by the cull shader.
    pub live: Arc<wgpu::Buffer>,
    current: DrawIndexedIndirectArgs,
}

impl IndirectArgsBuffer {
    pub fn new(device: &wgpu::Device, index_count: u32) -> Self {
        let seed_args = DrawIndexedIndirectArgs::seed(index_count);
        let seed = buffer::create_init(
            device,
            "Indirect Args Seed",
            std::slice::from_ref(&seed_args),
            wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
        );
        let live = buffer::create_storage(
            device,
            "Indirect Args",
            DrawIndexedIndirectArgs::SIZE,
            wgpu::BufferUsages::INDIRECT | wgpu::BufferUsages::COPY_SRC,
        );
        Self {
            seed,
            live,
            current: seed_args,
        }
    }

    /// Rewrites the static fields.  Called whenever indirect drawing is
    /// (re)activated.
    pub fn reseed(&mut self, queue: &wgpu::Queue, index_count: u32) {
        self.current = DrawIndexedIndirectArgs::seed(index_count);
        queue.write_buffer(&self.seed, 0, bytemuck::bytes_of(&self.current));
        log::debug!("indirect args reseeded: {:?}", self.current);
    }

    /// The static fields the next frame will start from.
    #[inline]
    pub fn seed_args(&self) -> DrawIndexedIndirectArgs {
        self.current
    }

    /// Records the seed → live copy that resets the instance count to 0.
    pub fn record_reset(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_buffer_to_buffer(&self.seed, 0, &self.live, 0, DrawIndexedIndirectArgs::SIZE);
    }
}

/// Issues the instanced draw described by `cmd`.  The only place in the
/// renderer that calls `draw_indexed*`.
pub fn submit(rpass: &mut wgpu::RenderPass<'_>, cmd: &DrawCommand) {
    rpass.set_bind_group(1, &*cmd.instance_bind_group, &[]);
    rpass.set_vertex_buffer(0, cmd.vertex_buffer.slice(..));
    rpass.set_index_buffer(cmd.index_buffer.slice(..), cmd.index_format);
    match &cmd.instances {
        InstanceSource::Direct { count } => {
            if *count > 0 {
                rpass.draw_indexed(0..cmd.index_count, 0, 0..*count);
            }
        }
        InstanceSource::Indirect { args, offset } => {
            rpass.draw_indexed_indirect(args, *offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_five_words() {
        assert_eq!(DrawIndexedIndirectArgs::SIZE, 20);
        let args = DrawIndexedIndirectArgs {
            index_count: 36,
            instance_count: 7,
            ..Default::default()
        };
        let words: &[u32] = bytemuck::cast_slice(bytemuck::bytes_of(&args));
        assert_eq!(words, &[36, 7, 0, 0, 0]);
    }

    #[test]
    fn static_fields_ignore_instance_count() {
        let seed = DrawIndexedIndirectArgs::seed(36);
        let frame = DrawIndexedIndirectArgs {
            instance_count: 12,
            ..seed
        };
        assert!(frame.same_static_fields(&seed));
        assert!(!DrawIndexedIndirectArgs::seed(6).same_static_fields(&seed));
    }

    #[test]
    fn from_bytes_checks_length() {
        let args = DrawIndexedIndirectArgs::seed(36);
        let bytes = bytemuck::bytes_of(&args);
        assert_eq!(DrawIndexedIndirectArgs::from_bytes(bytes), Some(args));
        assert_eq!(DrawIndexedIndirectArgs::from_bytes(&bytes[..16]), None);
    }
}
