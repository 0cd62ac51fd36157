//! Window, surface and event-loop shell around [`umbra_renderer::Renderer`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use umbra_app::{App, AppConfig, AppContext, KeyCode, UmbraApp};
//!
//! struct Viewer;
//!
//! impl UmbraApp for Viewer {
//!     fn update(&mut self, ctx: &mut AppContext) {
//!         if ctx.input.just_pressed(KeyCode::KeyC) {
//!             ctx.renderer.cycle_cull_mode();
//!         }
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load(None)?;
//!     umbra_app::logging::init(&config.log_level);
//!     App::new(Viewer).with_config(config).run()
//! }
//! ```

pub mod builder;
pub mod context;
mod graphics;
pub mod logging;
mod runner;
pub mod traits;

pub use builder::{App, AppConfig};
pub use context::AppContext;
pub use traits::UmbraApp;

// Users can do `use umbra_app::{InputState, KeyCode, Time};` without adding
// umbra_core as a direct dependency.
pub use umbra_core::{InputState, KeyCode, MouseButton, Time, TimeClock};
pub use umbra_renderer::{CullMode, CullStats, Renderer, RendererConfig};
