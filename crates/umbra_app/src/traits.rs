use crate::context::AppContext;

/// Hooks an application implements on top of the built-in frame loop.
///
/// The runner already feeds camera input to the renderer, advances the
/// animation and renders; an app only adds its own controls.  All methods
/// have empty default implementations.
///
/// ```rust,ignore
/// struct Viewer;
///
/// impl UmbraApp for Viewer {
///     fn update(&mut self, ctx: &mut AppContext) {
///         if ctx.input.just_pressed(KeyCode::Escape) {
///             ctx.request_exit();
///         }
///     }
/// }
/// ```
#[allow(unused_variables)]
pub trait UmbraApp {
    /// Called once after the window and GPU are ready.
    fn setup(&mut self, ctx: &mut AppContext) {}

    /// Called every frame before rendering.
    fn update(&mut self, ctx: &mut AppContext) {}

    /// Called whenever the window is resized.  The runner has already
    /// reconfigured the surface and the renderer.
    fn on_resize(&mut self, new_size: (u32, u32), ctx: &mut AppContext) {}
}
