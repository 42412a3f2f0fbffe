//! Logging setup for Hypatia services.
//!
//! The binding engine reports through `tracing` events and spans; this
//! crate configures how they are rendered.
//!
//! | Format | Use |
//! |--------|-----|
//! | [`LogFormat::Json`] | production, one JSON object per event |
//! | [`LogFormat::Pretty`] | development, multi-line human-readable |
//!
//! # Example
//!
//! ```rust
//! use hypatia_telemetry::{init_logging, LogConfig};
//!
//! let config = LogConfig {
//!     enabled: false,
//!     ..LogConfig::production()
//! };
//! init_logging(&config).unwrap();
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
