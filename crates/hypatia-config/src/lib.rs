//! # Hypatia Config
//!
//! Typed configuration for the binding engine.
//!
//! Configuration is layered: built-in defaults, then a TOML or JSON file,
//! then `PREFIX__SECTION__KEY` environment variables. Unknown fields in a
//! file are rejected.
//!
//! ## Example
//!
//! ```toml
//! [binding]
//! key_collision = "last_wins"
//! max_depth = 64
//!
//! [projection]
//! omit_defaults = false
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! ```no_run
//! use hypatia_config::ConfigLoader;
//!
//! # fn main() -> Result<(), hypatia_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("hypatia.toml")?
//!     .with_env_prefix("HYPATIA")
//!     .load()?;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{BindingConfig, LoggingConfig, ProjectionConfig};
