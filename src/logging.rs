//=========================================================================
// Logging
//=========================================================================
//
// One-shot `env_logger` setup for hosts that do not install their own
// logger.
//
// Targets used by the engine:
//   engine           lifecycle, frame loop, registry
//   engine::events   dispatcher registration (trace)
//   physics          accumulator lifecycle and passes
//   platform         window lifecycle
//   platform::input  raw input translation
//
// Filter precedence: `LoggingConfig::env_filter`, then `RUST_LOG`, then
// `info`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Once;

use log::{debug, LevelFilter};

//=== LoggingConfig =======================================================

/// Logger configuration.
///
/// `env_filter` uses `env_logger` filter syntax, for example
/// `"kinetic_engine=debug,platform::input=trace"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl LoggingConfig {
    /// Configuration with an explicit filter.
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

//=== Initialization ======================================================

static INIT: Once = Once::new();

/// Installs the global logger once.
///
/// Later calls are ignored. If the host already installed a logger, the
/// existing one is kept.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => match std::env::var("RUST_LOG") {
                Ok(filter) => {
                    builder.parse_filters(&filter);
                }
                Err(_) => {
                    builder.filter_level(LevelFilter::Info);
                }
            },
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            debug!(target: "engine", "Logging initialized");
        }
    });
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_filter() {
        let config = LoggingConfig::default();
        assert!(config.env_filter.is_none());
    }

    #[test]
    fn with_filter_sets_filter() {
        let config = LoggingConfig::with_filter("physics=trace");
        assert_eq!(config.env_filter.as_deref(), Some("physics=trace"));
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::with_filter("warn"));
        init_logging(LoggingConfig::default());
    }
}
