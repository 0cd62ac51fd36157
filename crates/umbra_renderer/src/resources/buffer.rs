/// Buffer creation helpers.  Every buffer the renderer owns is created
/// through one of these so labels and usages stay consistent.
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// Buffer initialised from a slice of `Pod` values.
pub fn create_init<T: bytemuck::Pod>(
    device: &wgpu::Device,
    label: &str,
    data: &[T],
    usage: wgpu::BufferUsages,
) -> Arc<wgpu::Buffer> {
    Arc::new(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(data),
        usage,
    }))
}

/// `UNIFORM | COPY_DST` buffer holding `data`, rewritten with
/// [`update_uniform`].
pub fn create_uniform<T: bytemuck::Pod>(
    device: &wgpu::Device,
    label: &str,
    data: &T,
) -> Arc<wgpu::Buffer> {
    create_init(
        device,
        label,
        std::slice::from_ref(data),
        wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    )
}

/// Zeroed `STORAGE | COPY_DST` buffer of `size` bytes plus any `extra`
/// usages (`INDIRECT`, `COPY_SRC`).
pub fn create_storage(
    device: &wgpu::Device,
    label: &str,
    size: wgpu::BufferAddress,
    extra: wgpu::BufferUsages,
) -> Arc<wgpu::Buffer> {
    Arc::new(device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST | extra,
        mapped_at_creation: false,
    }))
}

/// `MAP_READ | COPY_DST` staging buffer.  Owned by a single reader, so not
/// wrapped in an `Arc`.
pub fn create_readback(device: &wgpu::Device, label: &str, size: wgpu::BufferAddress) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Writes `data` to an existing uniform buffer.
pub fn update_uniform<T: bytemuck::Pod>(queue: &wgpu::Queue, buffer: &wgpu::Buffer, data: &T) {
    queue.write_buffer(buffer, 0, bytemuck::bytes_of(data));
}
