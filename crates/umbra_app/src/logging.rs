//! Global logger setup.
use std::str::FromStr;
use std::sync::Once;

use log::LevelFilter;

static INIT: Once = Once::new();

/// Crates that log every resource at `info` and drown the app's own output.
const NOISY: &[&str] = &["wgpu_core", "wgpu_hal", "naga"];

/// Parses a level name, falling back to `info` for anything unrecognised.
pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}

/// Installs a `fern` logger writing to stdout.  Only the first call has an
/// effect.
pub fn init(level: &str) {
    INIT.call_once(|| {
        let level = parse_level(level);
        let mut dispatch = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{:<5} {}] {}",
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(level);
        for target in NOISY {
            dispatch = dispatch.level_for(*target, level.min(LevelFilter::Warn));
        }
        if let Err(err) = dispatch.chain(std::io::stdout()).apply() {
            eprintln!("logger already installed: {err}");
            return;
        }
        log::debug!("logging initialized at {level}");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse_case_insensitively() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_level(" off "), LevelFilter::Off);
        assert_eq!(parse_level("loud"), LevelFilter::Info);
    }
}
