//! # Hypatia Extract
//!
//! Binds HTTP requests to declared operations and projects handler results
//! through declared response shapes.
//!
//! ## Overview
//!
//! | Type | Role |
//! |------|------|
//! | [`OperationSpec`] | Endpoint declaration: template, ordered [`Param`]s, response shape |
//! | [`RequestEnvelope`] | Raw path, query, header and body data of one request |
//! | [`Binder`] | Produces a [`CallFrame`] or every [`ValidationError`](hypatia_schema::ValidationError) |
//! | [`Projector`] | Shapes handler output with a [`ProjectionSpec`] |
//! | [`response`] | JSON and error responses |
//!
//! ## Example
//!
//! ```rust
//! use hypatia_extract::{Binder, OperationSpec, Param, RequestEnvelope};
//! use hypatia_schema::{FieldSpec, FieldType};
//! use serde_json::json;
//!
//! let op = OperationSpec::builder("read_items")
//!     .path("/items/")
//!     .param(Param::query(
//!         FieldSpec::new("q", FieldType::Str).optional().min_length(3).max_length(50),
//!     ))
//!     .build()
//!     .unwrap();
//!
//! let ok = RequestEnvelope::builder().query_string("q=fixedquery").build();
//! let frame = Binder::default().bind(&op, &ok).unwrap();
//! assert_eq!(frame.value("q"), Some(&json!("fixedquery")));
//!
//! let short = RequestEnvelope::builder().query_string("q=ab").build();
//! let err = Binder::default().bind(&op, &short).unwrap_err();
//! assert_eq!(err.validation_errors().unwrap().len(), 1);
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
mod envelope;
mod error;
mod frame;
mod operation;
mod path;
mod projection;
pub mod response;
pub mod source;

pub use binder::Binder;
pub use envelope::{QueryPairs, RequestEnvelope, RequestEnvelopeBuilder};
pub use error::{BindError, FrameError, ParamSource, ProjectionError};
pub use frame::CallFrame;
pub use operation::{OperationBuilder, OperationSpec, Param};
pub use path::{Params, PathTemplate};
pub use projection::{ProjectionSpec, Projector};
pub use response::{ErrorResponse, JsonResponse};
