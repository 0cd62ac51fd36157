pub mod compute;
pub mod instanced;
pub mod layout;
pub mod shader;

pub use compute::ComputePipeline;
pub use instanced::InstancedPipeline;
pub use layout::PipelineLayouts;
pub use shader::{LoadedShader, ShaderDefines, ShaderLibrary};
