//! HTTP responses for bound and projected operations.
//!
//! | Builder | Status | Body |
//! |---------|--------|------|
//! | [`JsonResponse`] | operation's status code | projected value |
//! | [`ErrorResponse::validation`] | `422` | `{"detail": [...]}` |
//! | [`ErrorResponse::from_bind_error`] | by error | `{"detail": ...}` |
//! | [`ErrorResponse::from_projection_error`] | `500` | `{"detail": "Internal Server Error"}` |
//!
//! # Example
//!
//! ```rust
//! use hypatia_extract::response::ErrorResponse;
//! use hypatia_schema::{Location, ValidationError};
//! use http::StatusCode;
//!
//! let errors = ValidationError::missing(Location::root("query").child("needy")).into();
//! let response = ErrorResponse::validation(&errors).into_response();
//! assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
//! ```

use crate::error::{BindError, ProjectionError};
use bytes::Bytes;
use hypatia_schema::ValidationErrors;
use http::{header, HeaderValue, Response, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

fn json_response(status: StatusCode, body: Vec<u8>) -> Response<Bytes> {
    let mut response = Response::new(Bytes::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// JSON response builder.
///
/// Creates an HTTP response with `Content-Type: application/json` and
/// the body serialized as JSON.
///
/// # Example
///
/// ```rust
/// use hypatia_extract::response::JsonResponse;
/// use serde_json::json;
///
/// let response = JsonResponse::created(json!({"name": "Foo"}));
/// assert_eq!(response.status(), http::StatusCode::CREATED);
/// ```
#[derive(Debug)]
pub struct JsonResponse<T> {
    data: T,
    status: StatusCode,
}

impl<T: Serialize> JsonResponse<T> {
    /// Creates a new JSON response with status 200 OK.
    #[must_use]
    pub fn new(data: T) -> Self {
        Self {
            data,
            status: StatusCode::OK,
        }
    }

    /// Creates a JSON response with status 201 Created.
    #[must_use]
    pub fn created(data: T) -> Self {
        Self {
            data,
            status: StatusCode::CREATED,
        }
    }

    /// Sets a custom status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns a reference to the data.
    #[must_use]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Builds the HTTP response.
    pub fn into_response(self) -> Result<Response<Bytes>, serde_json::Error> {
        let body = serde_json::to_vec(&self.data)?;
        Ok(json_response(self.status, body))
    }
}

/// Error response builder.
///
/// Bodies use a single `detail` member: the list of validation errors for
/// a rejected request, or a short message otherwise.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    status: StatusCode,
    detail: Value,
}

impl ErrorResponse {
    /// Creates an error response with a message detail.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            detail: Value::String(message.into()),
        }
    }

    /// Creates a 422 response listing every validation error.
    #[must_use]
    pub fn validation(errors: &ValidationErrors) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: json!(errors),
        }
    }

    /// Creates the response for a failed bind.
    ///
    /// Router faults are logged and reported without internals.
    #[must_use]
    pub fn from_bind_error(err: &BindError) -> Self {
        match err {
            BindError::Validation(errors) => Self::validation(errors),
            BindError::UnmatchedPathParam { .. } => {
                tracing::error!(error = %err, "router and operation disagree on path parameters");
                Self::internal_error()
            }
            BindError::UnsupportedMediaType { .. } => Self::new(err.status_code(), err.to_string()),
        }
    }

    /// Creates the response for a failed projection.
    #[must_use]
    pub fn from_projection_error(err: &ProjectionError) -> Self {
        tracing::error!(error = %err, code = err.error_code(), "response projection failed");
        Self::internal_error()
    }

    /// Creates a 500 Internal Server Error.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the `detail` member.
    #[must_use]
    pub fn detail(&self) -> &Value {
        &self.detail
    }

    /// Builds the HTTP response.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        let body = json!({ "detail": self.detail }).to_string().into_bytes();
        json_response(self.status, body)
    }
}
