use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use umbra_renderer::RendererConfig;

use crate::traits::UmbraApp;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "umbra.toml";

/// Initial window, logging and renderer settings.
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```toml
/// title = "culling"
/// width = 1600
/// log_level = "debug"
///
/// [renderer]
/// cull_mode = "cpu"
/// seed = 7
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// `log` level filter: off, error, warn, info, debug or trace.
    pub log_level: String,
    /// Seconds between statistics lines in the log; 0 disables them.
    pub stats_interval: f32,
    pub renderer: RendererConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Umbra".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            log_level: "info".to_string(),
            stats_interval: 5.0,
            renderer: RendererConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Reads `path`, or [`DEFAULT_CONFIG_FILE`] when `path` is `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }
}

/// The main entry point.  Uses the builder pattern to configure the app.
pub struct App<A: UmbraApp> {
    config: AppConfig,
    app_state: A,
}

impl<A: UmbraApp + 'static> App<A> {
    pub fn new(app_state: A) -> Self {
        Self {
            config: AppConfig::default(),
            app_state,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.config.title = title.to_string();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.config.vsync = vsync;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs the event loop until the window closes or the app requests exit.
    pub fn run(self) -> anyhow::Result<()> {
        crate::runner::run_internal(self.config, self.app_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_renderer::CullMode;

    #[test]
    fn empty_document_is_the_default() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_renderer_table_keeps_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            title = "bench"
            vsync = false

            [renderer]
            cull_mode = "cpu"
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.title, "bench");
        assert!(!config.vsync);
        assert_eq!(config.width, 1280);
        assert_eq!(config.renderer.cull_mode, CullMode::Cpu);
        assert_eq!(config.renderer.seed, 7);
        assert!(config.renderer.rotate);
    }

    #[test]
    fn unknown_cull_mode_is_rejected() {
        let err = AppConfig::from_toml_str("[renderer]\ncull_mode = \"sometimes\"").unwrap_err();
        assert!(format!("{err:#}").contains("invalid configuration"));
    }

    #[test]
    fn missing_default_file_falls_back() {
        // the test runner's working directory is the crate root, which has no umbra.toml
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(AppConfig::load(Some(Path::new("does/not/exist.toml"))).is_err());
    }

    #[test]
    fn builder_overrides_config() {
        struct Nothing;
        impl UmbraApp for Nothing {}
        let app = App::new(Nothing).with_title("t").with_size(10, 20).with_vsync(false);
        assert_eq!(app.config().title, "t");
        assert_eq!((app.config().width, app.config().height), (10, 20));
        assert!(!app.config().vsync);
    }
}
