// umbra_core: basic types shared by the renderer and the application shell

// GPU context (adapter + device + queue)
#[cfg(feature = "gpu")]
pub mod context;

// input helper for keyboard / mouse state
#[cfg(feature = "input")]
pub mod input;

// camera + key bindings; the controller maps winit key codes
#[cfg(feature = "input")]
pub mod scene;

pub mod time;

// re-export common input types so callers don't need to depend on winit
#[cfg(feature = "input")]
pub use input::{InputState, KeyCode, MouseButton};
#[cfg(feature = "input")]
pub use scene::{Camera, Controller};

pub use time::{Time, TimeClock};

pub use glam;
