//! Response projection.
//!
//! A handler's return value is projected through its declared output shape
//! before it is serialized: the value is coerced against the output type,
//! undeclared fields are dropped, optional include and exclude sets are
//! applied, and keys are renamed to their external names.
//!
//! Include and exclude name top-level fields of the output model, or of
//! each element when the output is a sequence of models. A name the model
//! does not declare, or any name when the output is a mapping, is matched
//! against keys as written. Include is applied first, then exclude is
//! removed.
//!
//! # Example
//!
//! ```rust
//! use hypatia_extract::{ProjectionSpec, Projector};
//! use hypatia_schema::{FieldSpec, FieldType, Schema};
//! use serde_json::json;
//!
//! let user_out = Schema::builder("UserOut")
//!     .field(FieldSpec::new("username", FieldType::Str))
//!     .field(FieldSpec::new("email", FieldType::Email))
//!     .build()
//!     .unwrap();
//!
//! let projected = Projector::default()
//!     .project(
//!         &json!({"username": "john", "password": "secret", "email": "john@example.com"}),
//!         &ProjectionSpec::model(&user_out),
//!     )
//!     .unwrap();
//! assert_eq!(projected, json!({"username": "john", "email": "john@example.com"}));
//! ```

use crate::error::ProjectionError;
use hypatia_schema::{CoerceOptions, Coercer, FieldType, Location, Schema};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// The declared shape of a response.
#[derive(Debug, Clone)]
pub struct ProjectionSpec {
    output: FieldType,
    include: Option<Vec<String>>,
    exclude: Vec<String>,
    omit_defaults: bool,
}

impl ProjectionSpec {
    /// Projects through `output`.
    #[must_use]
    pub fn new(output: FieldType) -> Self {
        Self {
            output,
            include: None,
            exclude: Vec::new(),
            omit_defaults: false,
        }
    }

    /// Projects through a model.
    #[must_use]
    pub fn model(schema: &Arc<Schema>) -> Self {
        Self::new(FieldType::model(schema))
    }

    /// Keeps only these fields.
    #[must_use]
    pub fn include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Drops these fields.
    #[must_use]
    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Leaves out fields whose value equals their declared default.
    #[must_use]
    pub fn omit_defaults(mut self, omit: bool) -> Self {
        self.omit_defaults = omit;
        self
    }

    /// Returns the output type.
    #[must_use]
    pub fn output(&self) -> &FieldType {
        &self.output
    }

    /// Returns the include set, if any.
    #[must_use]
    pub fn included(&self) -> Option<&[String]> {
        self.include.as_deref()
    }

    /// Returns the exclude set.
    #[must_use]
    pub fn excluded(&self) -> &[String] {
        &self.exclude
    }

    /// Returns true if default-valued fields are left out.
    #[must_use]
    pub fn omits_defaults(&self) -> bool {
        self.omit_defaults
    }
}

/// Projects handler results through their output shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct Projector {
    coercer: Coercer,
    omit_defaults: bool,
}

impl Projector {
    /// Creates a projector.
    ///
    /// `omit_defaults` applies to every projection; a spec can also turn it
    /// on for itself.
    #[must_use]
    pub fn new(options: CoerceOptions, omit_defaults: bool) -> Self {
        Self {
            coercer: Coercer::new(options),
            omit_defaults,
        }
    }

    /// Projects a value.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Invalid`] if the value does not coerce to
    /// the output type. That is a handler bug, never a client error.
    pub fn project(&self, value: &Value, spec: &ProjectionSpec) -> Result<Value, ProjectionError> {
        let omit_defaults = self.omit_defaults || spec.omit_defaults;
        let mut projected = self
            .coercer
            .coerce_output(&spec.output, value, &Location::root("response"), omit_defaults)
            .map_err(|errors| {
                tracing::error!(errors = %errors, "response does not match its output shape");
                ProjectionError::Invalid(errors)
            })?;

        if spec.include.is_some() || !spec.exclude.is_empty() {
            let keep = Filter::new(spec);
            match &mut projected {
                Value::Array(elements) => elements.iter_mut().for_each(|e| keep.apply(e)),
                other => keep.apply(other),
            }
        }
        tracing::debug!(omit_defaults, "response projected");
        Ok(projected)
    }

    /// Serializes `value` and projects the result.
    pub fn project_serialize<T: Serialize>(
        &self,
        value: &T,
        spec: &ProjectionSpec,
    ) -> Result<Value, ProjectionError> {
        let value = serde_json::to_value(value)?;
        self.project(&value, spec)
    }
}

// Include and exclude as sets of external names.
struct Filter {
    include: Option<HashSet<String>>,
    exclude: HashSet<String>,
}

impl Filter {
    fn new(spec: &ProjectionSpec) -> Self {
        let schemas = top_schemas(&spec.output);
        // A name no model declares, as with map output, is taken as a key.
        let external = |names: &[String]| -> HashSet<String> {
            let mut keys = HashSet::with_capacity(names.len());
            for name in names {
                let mut declared = schemas.iter().filter_map(|s| s.field(name)).peekable();
                if declared.peek().is_none() {
                    keys.insert(name.clone());
                }
                keys.extend(declared.map(|f| f.external_name().to_string()));
            }
            keys
        };
        Self {
            include: spec.include.as_deref().map(external),
            exclude: external(&spec.exclude),
        }
    }

    fn apply(&self, value: &mut Value) {
        if let Value::Object(object) = value {
            object.retain(|key, _| {
                self.include.as_ref().map_or(true, |keep| keep.contains(key))
                    && !self.exclude.contains(key)
            });
        }
    }
}

// The models whose fields include and exclude refer to.
fn top_schemas(ty: &FieldType) -> Vec<Arc<Schema>> {
    match ty {
        FieldType::Model(schema) => vec![Arc::clone(schema)],
        FieldType::Recursive(resolve) => vec![resolve()],
        FieldType::List(item) | FieldType::Set(item) => top_schemas(item),
        FieldType::Union(alternatives) => alternatives.iter().flat_map(top_schemas).collect(),
        _ => Vec::new(),
    }
}
