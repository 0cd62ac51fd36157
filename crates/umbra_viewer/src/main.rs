//! Instanced cubes with switchable frustum culling.
//!
//! | Input            | Action                              |
//! |------------------|-------------------------------------|
//! | W / A / S / D    | pan the orbit point                 |
//! | right drag       | orbit                               |
//! | wheel            | zoom                                |
//! | C                | cycle culling: off → cpu → gpu      |
//! | `=` / `+`        | add an instance                     |
//! | `-`              | remove an instance                  |
//! | `]` / `[`        | add / remove a point light          |
//! | N                | toggle normal visualisation         |
//! | Space            | toggle rotation                     |
//! | Escape           | quit                                |
//!
//! Usage: `umbra_viewer [config.toml]`
use std::path::PathBuf;

use umbra_app::{App, AppConfig, AppContext, KeyCode, UmbraApp};

#[derive(Default)]
struct CullingViewer;

impl UmbraApp for CullingViewer {
    fn setup(&mut self, ctx: &mut AppContext) {
        let stats = ctx.renderer.stats();
        log::info!(
            "{} instances, cull mode {}; C cycles modes, +/- change the count",
            stats.active,
            stats.mode
        );
    }

    fn update(&mut self, ctx: &mut AppContext) {
        let input = ctx.input;

        if input.just_pressed(KeyCode::Escape) {
            ctx.request_exit();
            return;
        }
        if input.just_pressed(KeyCode::KeyC) {
            ctx.renderer.cycle_cull_mode();
        }
        if input.just_pressed(KeyCode::Equal) || input.just_pressed(KeyCode::NumpadAdd) {
            if ctx.renderer.add_instance() {
                log::info!("instances: {}", ctx.renderer.store().active_count());
            }
        }
        if input.just_pressed(KeyCode::Minus) || input.just_pressed(KeyCode::NumpadSubtract) {
            if ctx.renderer.remove_instance() {
                log::info!("instances: {}", ctx.renderer.store().active_count());
            }
        }
        if input.just_pressed(KeyCode::BracketRight) && ctx.renderer.add_light() {
            log::info!("lights: {}", ctx.renderer.lighting.count());
        }
        if input.just_pressed(KeyCode::BracketLeft) && ctx.renderer.remove_light() {
            log::info!("lights: {}", ctx.renderer.lighting.count());
        }
        if input.just_pressed(KeyCode::KeyN) {
            let on = ctx.renderer.toggle_show_normals();
            log::info!("normals {}", if on { "on" } else { "off" });
        }
        if input.just_pressed(KeyCode::Space) {
            let on = ctx.renderer.toggle_rotation();
            log::info!("rotation {}", if on { "on" } else { "off" });
        }
    }
}

fn main() -> anyhow::Result<()> {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(path.as_deref())?;
    umbra_app::logging::init(&config.log_level);

    App::new(CullingViewer).with_config(config).run()
}
