//! Main configuration types.
//!
//! This module provides the top-level [`EngineConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{BindingConfig, ConfigError, LoggingConfig, ProjectionConfig};

/// Complete binding engine configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use hypatia_config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.logging.level, "info");
/// assert!(!config.projection.omit_defaults);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Request binding configuration.
    #[serde(default)]
    pub binding: BindingConfig,

    /// Response projection configuration.
    #[serde(default)]
    pub projection: ProjectionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use hypatia_config::{EngineConfig, ProjectionConfig};
    ///
    /// let config = EngineConfig::builder()
    ///     .projection(ProjectionConfig { omit_defaults: true })
    ///     .build();
    ///
    /// assert!(config.projection.omit_defaults);
    /// ```
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `binding.max_depth` is zero
    /// - `logging.level` is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.binding.max_depth == 0 {
            return Err(ConfigError::invalid_value(
                "binding.max_depth",
                "must be at least 1",
            ));
        }

        if let Err(e) = hypatia_telemetry::create_env_filter(&self.logging.level) {
            return Err(ConfigError::invalid_value("logging.level", e.to_string()));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Debug level, pretty output with colors and source locations.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = hypatia_telemetry::LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// Info level JSON logs, and mapping key collisions are rejected rather
    /// than silently resolved.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = hypatia_telemetry::LogFormat::Json;
        config.logging.ansi_enabled = false;

        config.binding.key_collision = hypatia_schema::KeyCollisionPolicy::Reject;

        config
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    binding: Option<BindingConfig>,
    projection: Option<ProjectionConfig>,
    logging: Option<LoggingConfig>,
}

impl EngineConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the binding configuration.
    #[must_use]
    pub fn binding(mut self, binding: BindingConfig) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Set the projection configuration.
    #[must_use]
    pub fn projection(mut self, projection: ProjectionConfig) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> EngineConfig {
        EngineConfig {
            binding: self.binding.unwrap_or_default(),
            projection: self.projection.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }
}
