//! Tracing subscriber setup for seeding binaries and test harnesses

use std::io;

use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Environment;

/// Logging configuration for factory and seeder output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "warn")
    pub level: String,
    /// Enable JSON structured logging (vs plain text)
    pub json_format: bool,
    /// Enable pretty printing for development
    pub pretty_print: bool,
    /// Environment filter, e.g. "elif_factory=debug,elif_fixtures=info"
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            pretty_print: false,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            pretty_print: true,
            env_filter: Some("elif_factory=debug,elif_fixtures=debug".to_string()),
        }
    }

    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            json_format: true,
            pretty_print: false,
            env_filter: Some("elif_factory=info,elif_fixtures=info".to_string()),
        }
    }

    /// Minimal output
    pub fn test() -> Self {
        Self {
            level: "error".to_string(),
            json_format: false,
            pretty_print: false,
            env_filter: Some("elif_factory=error".to_string()),
        }
    }

    /// Preset matching a seeding environment
    pub fn for_environment(env: &Environment) -> Self {
        match env {
            Environment::Production => Self::production(),
            Environment::Testing => Self::test(),
            _ => Self::development(),
        }
    }

    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn directives(&self) -> &str {
        self.env_filter.as_deref().unwrap_or(&self.level)
    }
}

/// Install a global subscriber. `RUST_LOG` overrides the configured filter.
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(config.directives()))?;

    if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stdout).json())
            .try_init()?;
    } else if config.pretty_print {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stdout).pretty())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stdout))
            .try_init()?;
    }

    tracing::info!(
        target: "elif_factory::logging",
        level = %config.level,
        format = if config.json_format { "json" } else { "text" },
        "logging initialized"
    );
    Ok(())
}
