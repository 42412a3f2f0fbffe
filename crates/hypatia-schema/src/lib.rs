//! # Hypatia Schema
//!
//! Declarative data shapes, per-field constraints and the coercion engine
//! behind Hypatia's request binding and response projection.
//!
//! | Type | Role |
//! |------|------|
//! | [`Schema`] | Named, ordered table of [`FieldSpec`]s, built once and shared |
//! | [`FieldSpec`] | Name, [`FieldType`], required/default, alias, constraints |
//! | [`ConstraintSet`] | Length, pattern and numeric bound rules of one field |
//! | [`Coercer`] | Converts raw values to declared types, collecting every failure |
//! | [`ValidationErrors`] | Ordered, serializable failure report |
//!
//! ## Example
//!
//! ```rust
//! use hypatia_schema::{Coercer, FieldSpec, FieldType, Location, Schema};
//! use serde_json::json;
//!
//! let item = Schema::builder("Item")
//!     .field(FieldSpec::new("name", FieldType::Str))
//!     .field(FieldSpec::new("price", FieldType::Float).gt(0.0))
//!     .field(FieldSpec::new("tags", FieldType::set(FieldType::Str)).default(json!([])))
//!     .build()
//!     .unwrap();
//!
//! let coercer = Coercer::default();
//! let value = coercer
//!     .validate_model(&item, &json!({"name": "Foo", "price": "42"}), &Location::root("body"))
//!     .unwrap();
//! assert_eq!(value, json!({"name": "Foo", "price": 42.0, "tags": []}));
//!
//! let errors = coercer
//!     .validate_model(&item, &json!({"price": 0}), &Location::root("body"))
//!     .unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod coerce;
mod constraint;
mod error;
mod field;
mod scalar;
mod schema;

pub use coerce::{CoerceOptions, Coercer, KeyCollisionPolicy, DEFAULT_MAX_DEPTH};
pub use constraint::{Constraint, ConstraintSet, Pattern};
pub use error::{ErrorKind, Location, PathSegment, SchemaError, ValidationError, ValidationErrors};
pub use field::{EnumType, FieldSpec, FieldType, SchemaFn};
pub use scalar::{FALSE_LITERALS, TRUE_LITERALS};
pub use schema::{Schema, SchemaBuilder};

/// Checks a standalone field declaration (one not owned by a [`Schema`]).
///
/// Operation parameters are declared as free-standing fields; this applies
/// the same declaration rules a schema build would.
pub fn check_field(owner: &str, field: &FieldSpec) -> Result<(), SchemaError> {
    schema::check_field(owner, field)
}
