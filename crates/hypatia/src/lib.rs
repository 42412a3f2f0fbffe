//! # Hypatia
//!
//! **Declarative request binding, validation and response projection**
//!
//! Hypatia binds HTTP requests to typed operation declarations:
//!
//! - **Schemas**: named field tables with types, defaults, aliases and
//!   constraints, declared once and shared across threads
//! - **Binding**: path, query, header and body values extracted, coerced
//!   and validated into a [`CallFrame`](prelude::CallFrame), or every
//!   failure reported at once as a `422`
//! - **Projection**: handler results reshaped through a declared output
//!   model, with include and exclude sets
//!
//! ## Quick Start
//!
//! ```rust
//! use hypatia::prelude::*;
//! use serde_json::json;
//!
//! let item = Schema::builder("Item")
//!     .field(FieldSpec::new("name", FieldType::Str))
//!     .field(FieldSpec::new("price", FieldType::Float))
//!     .build()
//!     .unwrap();
//!
//! let op = OperationSpec::builder("update_item")
//!     .method(http::Method::PUT)
//!     .path("/items/{item_id}")
//!     .param(Param::path(FieldSpec::new("item_id", FieldType::Int)))
//!     .param(Param::body(FieldSpec::new("item", FieldType::model(&item))))
//!     .build()
//!     .unwrap();
//!
//! let envelope = RequestEnvelope::builder()
//!     .path_params(op.match_path("/items/5").unwrap())
//!     .body(json!({"name": "Foo", "price": "42"}))
//!     .build();
//!
//! let frame = Engine::default().bind(&op, &envelope).unwrap();
//! assert_eq!(frame.value("item_id"), Some(&json!(5)));
//! assert_eq!(frame.value("item"), Some(&json!({"name": "Foo", "price": 42.0})));
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! Request → RequestEnvelope → Binder → CallFrame → handler
//!                                                     ↓
//! Response ← JsonResponse ← Projector ←──────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;

pub use engine::Engine;

// Re-export schema types
pub use hypatia_schema as schema;

// Re-export binding and projection types
pub use hypatia_extract as extract;

// Re-export configuration types
pub use hypatia_config as config;

// Re-export logging setup
pub use hypatia_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust
/// use hypatia::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Engine;

    pub use hypatia_schema::{
        CoerceOptions, Coercer, Constraint, FieldSpec, FieldType, KeyCollisionPolicy, Location,
        Schema, SchemaError, ValidationError, ValidationErrors,
    };

    pub use hypatia_extract::{
        BindError, Binder, CallFrame, OperationSpec, Param, ParamSource, ProjectionError,
        ProjectionSpec, Projector, RequestEnvelope,
    };

    pub use hypatia_extract::response::{ErrorResponse, JsonResponse};

    pub use hypatia_config::{ConfigLoader, EngineConfig};

    pub use hypatia_telemetry::{init_logging, LogConfig};
}
