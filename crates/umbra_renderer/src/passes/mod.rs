pub mod instanced_pass;

pub use instanced_pass::InstancedPass;
