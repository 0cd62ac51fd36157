pub mod buffer;
pub mod instance_buffer;

pub use instance_buffer::InstanceBuffer;
