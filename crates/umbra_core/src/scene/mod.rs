//! Camera state and the key bindings that drive it.

pub mod camera;
pub mod controller;

pub use camera::Camera;
pub use controller::Controller;
