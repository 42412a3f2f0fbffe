//! Request binding.
//!
//! The [`Binder`] turns a [`RequestEnvelope`] into the [`CallFrame`] of an
//! [`OperationSpec`]. Every declared parameter is extracted from its
//! source and coerced against its field declaration. A request either
//! binds completely or fails with every validation error at once; there is
//! no partial frame.

use crate::envelope::RequestEnvelope;
use crate::error::{BindError, ParamSource};
use crate::frame::CallFrame;
use crate::operation::OperationSpec;
use crate::source;
use hypatia_schema::{CoerceOptions, Coercer, Location, ValidationError, ValidationErrors};
use tracing::{debug, debug_span};

/// Binds requests to operations.
///
/// Stateless and cheap to copy; one binder can serve every operation
/// concurrently.
///
/// # Example
///
/// ```rust
/// use hypatia_extract::{Binder, OperationSpec, Param, RequestEnvelope};
/// use hypatia_schema::{FieldSpec, FieldType};
/// use serde_json::json;
///
/// let op = OperationSpec::builder("read_item")
///     .path("/items/{item_id}")
///     .param(Param::path(FieldSpec::new("item_id", FieldType::Int)))
///     .param(Param::query(FieldSpec::new("short", FieldType::Bool).default(json!(false))))
///     .build()
///     .unwrap();
///
/// let envelope = RequestEnvelope::builder()
///     .path_params(op.match_path("/items/42").unwrap())
///     .query("short", "yes")
///     .build();
///
/// let frame = Binder::default().bind(&op, &envelope).unwrap();
/// assert_eq!(frame.value("item_id"), Some(&json!(42)));
/// assert_eq!(frame.value("short"), Some(&json!(true)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Binder {
    coercer: Coercer,
}

impl Binder {
    /// Creates a binder with the given coercion options.
    #[must_use]
    pub fn new(options: CoerceOptions) -> Self {
        Self {
            coercer: Coercer::new(options),
        }
    }

    /// Returns the coercer used for parameter values.
    #[must_use]
    pub fn coercer(&self) -> &Coercer {
        &self.coercer
    }

    /// Binds one request.
    ///
    /// # Errors
    ///
    /// - [`BindError::Validation`] with every failing parameter's errors,
    ///   ordered by parameter declaration and then by position within the
    ///   value.
    /// - [`BindError::UnmatchedPathParam`] if the envelope lacks a path
    ///   parameter the operation declares.
    pub fn bind(
        &self,
        operation: &OperationSpec,
        envelope: &RequestEnvelope,
    ) -> Result<CallFrame, BindError> {
        let span = debug_span!("bind", operation_id = %operation.operation_id());
        let _guard = span.enter();

        let mut frame = CallFrame::with_capacity(operation.params().len());
        let mut errors = ValidationErrors::new();

        // An embedded body that is not an object fails once, not per key.
        let body_is_malformed = operation.body_schema().is_some()
            && envelope.body().is_some_and(|body| !body.is_object());
        let mut body_reported = false;

        for param in operation.params() {
            if body_is_malformed && param.source() == ParamSource::Body {
                if !body_reported {
                    errors.push(ValidationError::structure(
                        Location::root(ParamSource::Body.as_str()),
                        "type_error.dict",
                        "value is not a valid dict",
                    ));
                    body_reported = true;
                }
                continue;
            }

            let raw = match source::extract(param, envelope) {
                Ok(raw) => raw,
                Err(BindError::Validation(failed)) => {
                    errors.append(failed);
                    continue;
                }
                Err(BindError::UnmatchedPathParam { name, .. }) => {
                    return Err(BindError::UnmatchedPathParam {
                        operation: operation.operation_id().to_string(),
                        name,
                    });
                }
                Err(other) => return Err(other),
            };

            let location = source::location(param);
            match self.coercer.validate_field(param.field(), raw.as_ref(), &location) {
                Ok(value) => frame.insert(param.name(), value),
                Err(failed) => errors.append(failed),
            }

            if param.field().is_deprecated() && raw.is_some() {
                debug!(param = param.name(), "deprecated parameter supplied");
            }
        }

        if !errors.is_empty() {
            debug!(errors = errors.len(), "request failed validation");
            return Err(BindError::Validation(errors));
        }

        debug!(params = frame.len(), "request bound");
        Ok(frame)
    }
}
