use umbra_core::{InputState, Time};
use umbra_renderer::Renderer;
use winit::window::Window;

/// Per-frame context passed to every [`UmbraApp`](crate::UmbraApp) callback.
pub struct AppContext<'a> {
    /// Keyboard and mouse state for this frame.
    pub input: &'a InputState,

    /// Frame timing: delta, elapsed, FPS.
    pub time: Time,

    /// Current window size in physical pixels.
    pub window_size: (u32, u32),

    pub window: &'a Window,

    pub renderer: &'a mut Renderer,

    pub(crate) exit_requested: bool,
}

impl<'a> AppContext<'a> {
    /// Signal the event loop to shut down after the current frame.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.window_size.0
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.window_size.1
    }
}
