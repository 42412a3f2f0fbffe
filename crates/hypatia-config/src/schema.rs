//! Configuration section types.

use hypatia_schema::{CoerceOptions, KeyCollisionPolicy, DEFAULT_MAX_DEPTH};
use hypatia_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

/// Request binding configuration.
///
/// ```toml
/// [binding]
/// key_collision = "reject"
/// max_depth = 32
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    /// What to do when two mapping keys coerce to the same key.
    #[serde(default)]
    pub key_collision: KeyCollisionPolicy,

    /// Maximum nesting of models, sequences and mappings in a value.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            key_collision: KeyCollisionPolicy::default(),
            max_depth: default_max_depth(),
        }
    }
}

impl BindingConfig {
    /// Returns the coercion options for this section.
    #[must_use]
    pub fn coerce_options(&self) -> CoerceOptions {
        CoerceOptions {
            key_collision: self.key_collision,
            max_depth: self.max_depth,
        }
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Response projection configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectionConfig {
    /// Leave fields equal to their declared default out of every response.
    #[serde(default)]
    pub omit_defaults: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts this section into a subscriber configuration.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            span_events: self.format == LogFormat::Pretty,
            file_line_info: self.include_location,
            include_target: true,
            ansi: self.ansi_enabled,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
