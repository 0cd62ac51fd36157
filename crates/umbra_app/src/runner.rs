use std::sync::Arc;

use umbra_core::{InputState, TimeClock};
use umbra_renderer::{CullMode, CullStats};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::builder::AppConfig;
use crate::context::AppContext;
use crate::graphics::GraphicsState;
use crate::traits::UmbraApp;

/// Pixel-precise wheels (touchpads) report pixels; this many make one line.
const PIXELS_PER_LINE: f32 = 40.0;
/// Seconds between window title refreshes.
const TITLE_INTERVAL: f64 = 0.5;

struct Runner<A: UmbraApp> {
    app: A,
    config: AppConfig,
    window: Option<Arc<Window>>,
    graphics: Option<GraphicsState>,
    input: InputState,
    window_size: (u32, u32),
    clock: TimeClock,
    last_title: f64,
    last_log: f64,
    /// Set when the loop stops because of an error; returned from `run`.
    fatal: Option<anyhow::Error>,
}

impl<A: UmbraApp> Runner<A> {
    fn new(app: A, config: AppConfig) -> Self {
        Self {
            app,
            config,
            window: None,
            graphics: None,
            input: InputState::new(),
            window_size: (0, 0),
            clock: TimeClock::new(),
            last_title: 0.0,
            last_log: 0.0,
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        event_loop.exit();
    }
}

/// Visible count for display: whatever the active mode last measured.
fn visible_count(stats: &CullStats) -> Option<u32> {
    match stats.mode {
        CullMode::Disabled => Some(stats.active as u32),
        CullMode::Cpu => stats.cpu_visible,
        CullMode::Gpu => stats.gpu_visible,
    }
}

fn stats_line(stats: &CullStats, fps: f32) -> String {
    let visible = visible_count(stats).map_or_else(|| "-".to_string(), |v| v.to_string());
    format!(
        "cull {} | {}/{} visible | {:.0} fps",
        stats.mode, visible, stats.active, fps
    )
}

impl<A: UmbraApp> ApplicationHandler for Runner<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.width,
                self.config.height,
            ));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };
        let size = window.inner_size();
        self.window_size = (size.width, size.height);

        let mut gfx = match pollster::block_on(GraphicsState::new(
            window.clone(),
            size.width,
            size.height,
            self.config.vsync,
            &self.config.renderer,
        )) {
            Ok(gfx) => gfx,
            Err(err) => return self.fail(event_loop, err.context("graphics initialisation failed")),
        };

        let mut ctx = AppContext {
            input: &self.input,
            time: self.clock.peek(),
            window_size: self.window_size,
            window: &window,
            renderer: &mut gfx.renderer,
            exit_requested: false,
        };
        self.app.setup(&mut ctx);
        if ctx.exit_requested {
            event_loop.exit();
        }

        self.window = Some(window);
        self.graphics = Some(gfx);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                let new_size = (size.width, size.height);
                let (Some(gfx), Some(window)) = (&mut self.graphics, &self.window) else {
                    return;
                };
                gfx.resize(size.width, size.height);
                self.window_size = new_size;

                let mut ctx = AppContext {
                    input: &self.input,
                    time: self.clock.peek(),
                    window_size: new_size,
                    window,
                    renderer: &mut gfx.renderer,
                    exit_requested: false,
                };
                self.app.on_resize(new_size, &mut ctx);
                if ctx.exit_requested {
                    event_loop.exit();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.input
                        .update_key(code, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input
                    .update_mouse_button(button, state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.set_mouse_position(position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                self.input.add_scroll(lines);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gfx), Some(window)) = (&mut self.graphics, &self.window) else {
            return;
        };

        // Advance the frame clock
        let time = self.clock.tick();

        // ── 1. UPDATE ────────────────────────────────────────────────────────
        {
            let mut ctx = AppContext {
                input: &self.input,
                time,
                window_size: self.window_size,
                window,
                renderer: &mut gfx.renderer,
                exit_requested: false,
            };
            self.app.update(&mut ctx);
            if ctx.exit_requested {
                event_loop.exit();
                return;
            }
        }

        gfx.renderer.handle_input(&mut self.input, time.delta);
        gfx.renderer.update(time.delta);

        // ── 2. RENDER ────────────────────────────────────────────────────────
        let frame = match gfx.acquire() {
            Ok(frame) => frame,
            Err(err) => {
                let err = anyhow::Error::new(err).context("surface acquisition failed");
                return self.fail(event_loop, err);
            }
        };
        if let Some(frame) = frame {
            let view = frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            let mut encoder = gfx.renderer.begin_frame();
            gfx.renderer.render_to_view(&mut encoder, &view);
            gfx.renderer.context.queue.submit(Some(encoder.finish()));
            frame.present();
            gfx.renderer.finish_frame();
        }

        // ── 3. STATS ─────────────────────────────────────────────────────────
        let stats = gfx.renderer.stats();
        if time.elapsed - self.last_title >= TITLE_INTERVAL {
            self.last_title = time.elapsed;
            window.set_title(&format!("{} | {}", self.config.title, stats_line(&stats, time.fps)));
        }
        let interval = self.config.stats_interval as f64;
        if interval > 0.0 && time.elapsed - self.last_log >= interval {
            self.last_log = time.elapsed;
            let ring = gfx.renderer.gpu_culler().ring();
            log::info!(
                "{} | frame {} | readback of frame {:?} | skipped {} lost {}",
                stats_line(&stats, time.fps),
                stats.frame,
                stats.last_completed_frame,
                ring.skipped_frames(),
                ring.lost_queries()
            );
        }

        // ── End-of-frame input cleanup ───────────────────────────────────────
        // Must happen AFTER all update/draw callbacks have read just_pressed etc.
        self.input.end_frame();

        window.request_redraw();
    }
}

pub(crate) fn run_internal<A: UmbraApp + 'static>(config: AppConfig, app: A) -> anyhow::Result<()> {
    let mut runner = Runner::new(app, config);
    let event_loop = EventLoop::new()?;
    // Poll = spin the loop as fast as possible; no sleeping between frames.
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.run_app(&mut runner)?;
    match runner.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(mode: CullMode) -> CullStats {
        CullStats {
            mode,
            active: 10,
            cpu_visible: Some(7),
            gpu_visible: None,
            last_completed_frame: None,
            frame: 3,
        }
    }

    #[test]
    fn visible_count_follows_mode() {
        assert_eq!(visible_count(&stats(CullMode::Disabled)), Some(10));
        assert_eq!(visible_count(&stats(CullMode::Cpu)), Some(7));
        assert_eq!(visible_count(&stats(CullMode::Gpu)), None);
    }

    #[test]
    fn stats_line_shows_placeholder_before_first_readback() {
        assert_eq!(stats_line(&stats(CullMode::Gpu), 59.6), "cull gpu | -/10 visible | 60 fps");
    }
}
