// Logging init for qsfuzz
//
// Everything goes to stderr so stdout stays a clean stream of candidate URLs.

use tracing_subscriber::EnvFilter;

/// Verbosity picked from the CLI flags. `RUST_LOG` still wins when set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Silent,
    #[default]
    Normal,
    Debug,
}

impl Verbosity {
    pub fn from_flags(silent: bool, debug: bool) -> Self {
        if debug {
            Verbosity::Debug
        } else if silent {
            Verbosity::Silent
        } else {
            Verbosity::Normal
        }
    }

    pub fn default_directive(&self) -> &'static str {
        match self {
            Verbosity::Silent => "warn",
            Verbosity::Normal => "info",
            Verbosity::Debug => "debug",
        }
    }
}

pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
