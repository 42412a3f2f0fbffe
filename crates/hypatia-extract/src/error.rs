//! Binding and projection error types.
//!
//! Validation failures are the caller's fault and map to `422`. Everything
//! else raised here points at a routing or handler bug and maps to `500`,
//! except an unsupported body media type.

use hypatia_schema::{ValidationError, ValidationErrors};
use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Where a parameter value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSource {
    /// Path parameters (e.g., `/items/{item_id}`)
    Path,
    /// Query string parameters
    Query,
    /// HTTP headers
    Header,
    /// Decoded request body
    Body,
}

impl ParamSource {
    /// Returns the first segment of error locations for this source.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by [`Binder::bind`](crate::Binder::bind).
///
/// # Example
///
/// ```rust
/// use hypatia_extract::BindError;
/// use hypatia_schema::{Location, ValidationError};
/// use http::StatusCode;
///
/// let err = BindError::from(ValidationError::missing(Location::root("query").child("needy")));
/// assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
/// assert_eq!(err.error_code(), "VALIDATION_ERROR");
/// ```
#[derive(Debug, Error)]
pub enum BindError {
    /// One or more parameters failed validation.
    #[error("request validation failed: {0}")]
    Validation(ValidationErrors),

    /// A declared path parameter was not captured by the router.
    #[error("path parameter '{name}' of operation '{operation}' was not captured by the router")]
    UnmatchedPathParam {
        /// Operation being bound.
        operation: String,
        /// Missing parameter.
        name: String,
    },

    /// The request body is not JSON.
    #[error("unsupported media type '{content_type}', expected application/json")]
    UnsupportedMediaType {
        /// The Content-Type the client sent.
        content_type: String,
    },
}

impl BindError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UnmatchedPathParam { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    /// Returns a stable error code string.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UnmatchedPathParam { .. } => "UNMATCHED_PATH_PARAM",
            Self::UnsupportedMediaType { .. } => "UNSUPPORTED_MEDIA_TYPE",
        }
    }

    /// Returns the validation errors, if this is a validation failure.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for BindError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<ValidationError> for BindError {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error.into())
    }
}

/// Error returned when an outgoing value cannot be projected.
///
/// Always a server fault: the handler produced a value that does not fit
/// its declared output shape.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The value does not coerce to the output type.
    #[error("response does not match the declared output shape: {0}")]
    Invalid(ValidationErrors),

    /// The value could not be turned into JSON.
    #[error("response could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ProjectionError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Returns a stable error code string.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "RESPONSE_VALIDATION_ERROR",
            Self::Serialize(_) => "RESPONSE_SERIALIZATION_ERROR",
        }
    }
}

/// Error returned when reading a typed value out of a [`CallFrame`](crate::CallFrame).
#[derive(Debug, Error)]
pub enum FrameError {
    /// No parameter with this name was bound.
    #[error("no bound parameter named '{0}'")]
    Missing(String),

    /// The bound value does not deserialize into the requested type.
    #[error("parameter '{name}' cannot be read as the requested type: {source}")]
    Decode {
        /// Parameter name.
        name: String,
        /// Deserialization failure.
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypatia_schema::Location;

    #[test]
    fn test_param_source_display() {
        assert_eq!(ParamSource::Path.to_string(), "path");
        assert_eq!(ParamSource::Query.to_string(), "query");
        assert_eq!(ParamSource::Header.to_string(), "header");
        assert_eq!(ParamSource::Body.to_string(), "body");
    }

    #[test]
    fn test_bind_error_status_codes() {
        let validation = BindError::from(ValidationError::missing(Location::root("body")));
        assert_eq!(validation.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(validation.validation_errors().map(ValidationErrors::len), Some(1));

        let unmatched = BindError::UnmatchedPathParam {
            operation: "read_item".into(),
            name: "item_id".into(),
        };
        assert_eq!(unmatched.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(unmatched.validation_errors().is_none());
        assert!(unmatched.to_string().contains("item_id"));

        let media = BindError::UnsupportedMediaType {
            content_type: "text/plain".into(),
        };
        assert_eq!(media.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(media.error_code(), "UNSUPPORTED_MEDIA_TYPE");
    }

    #[test]
    fn test_projection_error_is_server_fault() {
        let err = ProjectionError::Invalid(ValidationErrors::new());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "RESPONSE_VALIDATION_ERROR");
    }
}
