//! Logging setup
//!
//! Logs go to stderr, or to the configured `log_file`. The level comes
//! from the `-v` count unless `PAPYRUS_LOG` holds a filter directive.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an explicit filter directive
const LOG_ENV: &str = "PAPYRUS_LOG";

/// Level name for a `-v` count
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn env_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = level_for(verbose);
        EnvFilter::new(format!("papyrus_core={},papyrus_cli={}", level, level))
    })
}

/// Install the global subscriber (ignores a second call)
pub fn init(verbose: u8, log_file: Option<&Path>) {
    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(env_filter(verbose))
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
                debug!("logging to {:?}", path);
                return;
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", path, e);
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
