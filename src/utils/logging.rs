use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Logging configuration options.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level.
    pub level: Level,
    /// Whether to include timestamps.
    pub timestamps: bool,
    /// Whether to include source code locations.
    pub source_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            timestamps: true,
            source_location: false,
        }
    }
}

/// Initialize the logging system. Safe to call more than once; only the
/// first call installs a subscriber.
pub fn setup_logging(config: LogConfig) -> Result<(), String> {
    let mut result = Ok(());

    INIT.call_once(|| {
        result = setup_logging_internal(config);
    });

    result
}

fn setup_logging_internal(config: LogConfig) -> Result<(), String> {
    let filter = EnvFilter::from_default_env().add_directive(config.level.into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    if config.timestamps {
        builder
            .try_init()
            .map_err(|e| format!("Failed to set global subscriber: {}", e))
    } else {
        builder
            .without_time()
            .try_init()
            .map_err(|e| format!("Failed to set global subscriber: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_is_idempotent() {
        assert!(setup_logging(LogConfig::default()).is_ok());
        // Second call is a no-op rather than an error.
        assert!(setup_logging(LogConfig::default()).is_ok());
    }
}
