//! Coercion and validation of raw values against declared types.
//!
//! The [`Coercer`] turns an untyped raw value into a value of a field's
//! declared type, descending into nested schemas, sequences and mappings,
//! and then runs the field's constraints. It never stops at the first
//! failure: every error found anywhere in the value is reported.
//!
//! Coerced values are plain [`serde_json::Value`]s. Model values are objects
//! keyed by internal field names in declaration order, with defaults filled
//! in for absent optional fields and undeclared keys dropped.
//!
//! # Example
//!
//! ```rust
//! use hypatia_schema::{Coercer, FieldSpec, FieldType, Location};
//! use serde_json::json;
//!
//! let field = FieldSpec::new("size", FieldType::Float).gt(0.0).lt(10.5);
//! let coercer = Coercer::default();
//!
//! let value = coercer
//!     .validate_field(&field, Some(&json!("3.5")), &Location::root("query").child("size"))
//!     .unwrap();
//! assert_eq!(value, json!(3.5));
//!
//! let errors = coercer
//!     .validate_field(&field, Some(&json!("0")), &Location::root("query").child("size"))
//!     .unwrap_err();
//! assert_eq!(errors.len(), 1);
//! ```

use crate::error::{Location, ValidationError, ValidationErrors};
use crate::field::{FieldSpec, FieldType};
use crate::scalar::{self, Failure};
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// What to do when two mapping keys coerce to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCollisionPolicy {
    /// The later entry replaces the earlier one.
    #[default]
    LastWins,
    /// The later entry is reported as a structural error.
    Reject,
}

/// Default nesting limit.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Coercion options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoerceOptions {
    /// Mapping key collision policy.
    pub key_collision: KeyCollisionPolicy,
    /// Maximum nesting of models, sequences and mappings.
    pub max_depth: usize,
}

impl Default for CoerceOptions {
    fn default() -> Self {
        Self {
            key_collision: KeyCollisionPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// Input keys model values by internal name; output keys them by external
// name and may drop fields equal to their declared default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Input,
    Output { omit_defaults: bool },
}

/// Stateless coercer; cheap to copy and safe to share.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coercer {
    options: CoerceOptions,
    mode: Mode,
}

impl Coercer {
    /// Creates a coercer with the given options.
    #[must_use]
    pub fn new(options: CoerceOptions) -> Self {
        Self {
            options,
            mode: Mode::Input,
        }
    }

    /// Returns the options.
    #[must_use]
    pub fn options(&self) -> &CoerceOptions {
        &self.options
    }

    /// Validates one field.
    ///
    /// `raw` is `None` when the field is absent from its source: a required
    /// field then reports a missing error, an optional one yields its
    /// default without further validation.
    pub fn validate_field(
        &self,
        field: &FieldSpec,
        raw: Option<&Value>,
        location: &Location,
    ) -> Result<Value, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let value = self.field_into(field, raw, location, 0, &mut errors);
        match value {
            Some(value) if errors.is_empty() => Ok(value),
            _ => Err(errors),
        }
    }

    /// Coerces a keyed structure against a schema.
    pub fn validate_model(
        &self,
        schema: &Schema,
        raw: &Value,
        location: &Location,
    ) -> Result<Value, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let value = self.model_into(schema, raw, location, 0, &mut errors);
        match value {
            Some(value) if errors.is_empty() => Ok(value),
            _ => Err(errors),
        }
    }

    /// Coerces a raw value to a type, without field-level options.
    pub fn coerce(
        &self,
        ty: &FieldType,
        raw: &Value,
        location: &Location,
    ) -> Result<Value, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let value = self.type_into(ty, raw, location, 0, &mut errors);
        match value {
            Some(value) if errors.is_empty() => Ok(value),
            _ => Err(errors),
        }
    }

    /// Coerces an outgoing value to a type for serialization.
    ///
    /// Works like [`Coercer::coerce`] except that model values come out keyed
    /// by external names. Fields are read by external name first and by
    /// internal name as a fallback, so a value produced by a previous
    /// coercion projects unchanged. With `omit_defaults`, fields whose value
    /// equals their declared default are left out at every level.
    pub fn coerce_output(
        &self,
        ty: &FieldType,
        raw: &Value,
        location: &Location,
        omit_defaults: bool,
    ) -> Result<Value, ValidationErrors> {
        let output = Self {
            mode: Mode::Output { omit_defaults },
            ..*self
        };
        output.coerce(ty, raw, location)
    }

    // Returns `None` exactly when at least one error was appended.
    fn field_into(
        &self,
        field: &FieldSpec,
        raw: Option<&Value>,
        location: &Location,
        depth: usize,
        errors: &mut ValidationErrors,
    ) -> Option<Value> {
        let Some(raw) = raw else {
            if field.is_required() {
                errors.push(ValidationError::missing(location.clone()));
                return None;
            }
            return Some(field.default_value().cloned().unwrap_or(Value::Null));
        };

        if raw.is_null() {
            if field.is_nullable() {
                return Some(Value::Null);
            }
            errors.push(ValidationError::type_error(
                location.clone(),
                "type_error.none.not_allowed",
                "none is not an allowed value",
            ));
            return None;
        }

        let value = self.type_into(field.ty(), raw, location, depth, errors)?;
        let before = errors.len();
        field.constraints().validate(&value, location, errors);
        (errors.len() == before).then_some(value)
    }

    fn type_into(
        &self,
        ty: &FieldType,
        raw: &Value,
        location: &Location,
        depth: usize,
        errors: &mut ValidationErrors,
    ) -> Option<Value> {
        let scalar = |result: Result<Value, Failure>, errors: &mut ValidationErrors| match result {
            Ok(value) => Some(value),
            Err((code, message)) => {
                errors.push(ValidationError::type_error(location.clone(), code, message).with_input(raw));
                None
            }
        };

        match ty {
            FieldType::Any => Some(raw.clone()),
            FieldType::Str => scalar(scalar::parse_str(raw), errors),
            FieldType::Int => scalar(scalar::parse_int(raw), errors),
            FieldType::Float => scalar(scalar::parse_float(raw), errors),
            FieldType::Bool => scalar(scalar::parse_bool(raw), errors),
            FieldType::Email => scalar(scalar::parse_email(raw), errors),
            FieldType::Url => scalar(scalar::parse_url(raw), errors),
            FieldType::Enum(e) => scalar(scalar::parse_enum(raw, e), errors),
            FieldType::Model(schema) => self.model_into(schema, raw, location, depth, errors),
            FieldType::Recursive(resolve) => {
                let schema = resolve();
                self.model_into(&schema, raw, location, depth, errors)
            }
            FieldType::List(item) => self.sequence_into(item, raw, location, depth, false, errors),
            FieldType::Set(item) => self.sequence_into(item, raw, location, depth, true, errors),
            FieldType::Map(key, value) => self.map_into(key, value, raw, location, depth, errors),
            FieldType::Union(alternatives) => {
                let mut rejected = ValidationErrors::new();
                for alternative in alternatives {
                    let mut attempt = ValidationErrors::new();
                    if let Some(value) = self.type_into(alternative, raw, location, depth, &mut attempt) {
                        return Some(value);
                    }
                    rejected.append(attempt);
                }
                errors.append(rejected);
                None
            }
        }
    }

    fn enter(&self, location: &Location, depth: usize, errors: &mut ValidationErrors) -> bool {
        if depth >= self.options.max_depth {
            errors.push(ValidationError::structure(
                location.clone(),
                "value_error.depth",
                format!("maximum nesting depth of {} exceeded", self.options.max_depth),
            ));
            return false;
        }
        true
    }

    fn model_into(
        &self,
        schema: &Schema,
        raw: &Value,
        location: &Location,
        depth: usize,
        errors: &mut ValidationErrors,
    ) -> Option<Value> {
        let Some(object) = raw.as_object() else {
            errors.push(
                ValidationError::structure(location.clone(), "type_error.dict", "value is not a valid dict")
                    .with_input(raw),
            );
            return None;
        };
        if !self.enter(location, depth, errors) {
            return None;
        }

        let before = errors.len();
        let mut out = Map::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let key = field.external_name();
            let child = location.child(key);
            let raw_value = match self.mode {
                Mode::Input => object.get(key),
                Mode::Output { .. } => object.get(key).or_else(|| object.get(field.name())),
            };
            let Some(value) = self.field_into(field, raw_value, &child, depth + 1, errors) else {
                continue;
            };
            match self.mode {
                Mode::Input => {
                    out.insert(field.name().to_string(), value);
                }
                Mode::Output { omit_defaults } => {
                    if omit_defaults && field.default_value() == Some(&value) {
                        continue;
                    }
                    out.insert(key.to_string(), value);
                }
            }
        }
        (errors.len() == before).then_some(Value::Object(out))
    }

    fn sequence_into(
        &self,
        item: &FieldType,
        raw: &Value,
        location: &Location,
        depth: usize,
        dedup: bool,
        errors: &mut ValidationErrors,
    ) -> Option<Value> {
        let Some(elements) = raw.as_array() else {
            let (code, message) = if dedup {
                ("type_error.set", "value is not a valid set")
            } else {
                ("type_error.list", "value is not a valid list")
            };
            errors.push(ValidationError::structure(location.clone(), code, message).with_input(raw));
            return None;
        };
        if !self.enter(location, depth, errors) {
            return None;
        }

        let before = errors.len();
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(elements.len());
        for (i, element) in elements.iter().enumerate() {
            let Some(value) = self.type_into(item, element, &location.index(i), depth + 1, errors) else {
                continue;
            };
            if dedup && !seen.insert(value.to_string()) {
                continue;
            }
            out.push(value);
        }
        (errors.len() == before).then_some(Value::Array(out))
    }

    fn map_into(
        &self,
        key_ty: &FieldType,
        value_ty: &FieldType,
        raw: &Value,
        location: &Location,
        depth: usize,
        errors: &mut ValidationErrors,
    ) -> Option<Value> {
        let Some(object) = raw.as_object() else {
            errors.push(
                ValidationError::structure(location.clone(), "type_error.dict", "value is not a valid dict")
                    .with_input(raw),
            );
            return None;
        };
        if !self.enter(location, depth, errors) {
            return None;
        }

        let before = errors.len();
        let mut out = Map::with_capacity(object.len());
        for (raw_key, raw_value) in object {
            let child = location.child(raw_key.as_str());
            let key = self.type_into(key_ty, &Value::String(raw_key.clone()), &child, depth + 1, errors);
            let value = self.type_into(value_ty, raw_value, &child, depth + 1, errors);
            let (Some(key), Some(value)) = (key, value) else {
                continue;
            };

            let key = scalar::key_string(&key);
            if out.contains_key(&key) && self.options.key_collision == KeyCollisionPolicy::Reject {
                errors.push(ValidationError::structure(
                    child,
                    "value_error.dict.duplicate_key",
                    format!("key '{raw_key}' collides with an earlier key after coercion to '{key}'"),
                ));
                continue;
            }
            out.insert(key, value);
        }
        (errors.len() == before).then_some(Value::Object(out))
    }
}
