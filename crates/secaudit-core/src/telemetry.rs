//! Tracing initialisation for secaudit front ends.
//!
//! Embedders call [`init_tracing`] once at startup. Later calls are ignored,
//! since the global subscriber can only be set once per process.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset: `level` for secaudit crates,
/// `warn` for HTTP internals.
pub fn default_filter(level: Level) -> EnvFilter {
    let level = level.as_str().to_lowercase();
    EnvFilter::new(format!(
        "warn,secaudit_core={level},secaudit_cli={level},secaudit={level}"
    ))
}

/// Initialise the global tracing subscriber.
///
/// * `json`: emit newline-delimited JSON log lines.
/// * `level`: secaudit verbosity when `RUST_LOG` is not set.
///
/// Logs go to stderr so rendered reports on stdout stay clean.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_mentions_crates() {
        let filter = default_filter(Level::DEBUG).to_string();
        assert!(filter.contains("secaudit_core=debug"));
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(false, Level::INFO);
        init_tracing(true, Level::DEBUG);
    }
}
