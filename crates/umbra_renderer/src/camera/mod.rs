pub mod controller;
pub mod uniform;

pub use controller::OrbitState;
pub use uniform::{GpuScene, Lighting, PointLight, SceneUniform, MAX_LIGHTS};

// Re-export core camera types so callers only need to import from one place.
pub use umbra_core::scene::{Camera, Controller};
