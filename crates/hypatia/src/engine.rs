//! The binding engine.
//!
//! An [`Engine`] is a [`Binder`] and a [`Projector`] configured from one
//! [`EngineConfig`]. It is `Copy` and holds no per-request state, so a
//! single engine serves every operation from any thread.

use bytes::Bytes;
use hypatia_config::EngineConfig;
use hypatia_extract::{
    BindError, Binder, CallFrame, ErrorResponse, JsonResponse, OperationSpec, Params,
    ProjectionError, Projector, RequestEnvelope,
};
use http::{Request, Response};
use serde_json::Value;

/// Binds requests and projects responses for declared operations.
///
/// # Example
///
/// ```rust
/// use hypatia::prelude::*;
/// use serde_json::json;
///
/// let op = OperationSpec::builder("read_item")
///     .path("/items/{item_id}")
///     .param(Param::path(FieldSpec::new("item_id", FieldType::Int)))
///     .param(Param::query(FieldSpec::new("q", FieldType::Str).optional()))
///     .build()
///     .unwrap();
///
/// let engine = Engine::new(&EngineConfig::default());
/// let request = http::Request::get("/items/5?q=somequery")
///     .body(bytes::Bytes::new())
///     .unwrap();
///
/// let response = engine.handle(&op, &request, |frame| {
///     json!({"item_id": frame.value("item_id"), "q": frame.value("q")})
/// });
/// assert_eq!(response.status(), http::StatusCode::OK);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    binder: Binder,
    projector: Projector,
}

impl Engine {
    /// Creates an engine from configuration.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let options = config.binding.coerce_options();
        Self {
            binder: Binder::new(options),
            projector: Projector::new(options, config.projection.omit_defaults),
        }
    }

    /// Returns the binder.
    #[must_use]
    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    /// Returns the projector.
    #[must_use]
    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Binds an envelope to `operation`.
    pub fn bind(
        &self,
        operation: &OperationSpec,
        envelope: &RequestEnvelope,
    ) -> Result<CallFrame, BindError> {
        self.binder.bind(operation, envelope)
    }

    /// Binds an HTTP request to `operation`.
    ///
    /// Path parameters are captured with the operation's own template. A
    /// request path the template does not match captures nothing, so any
    /// declared path parameter then fails as unmatched.
    pub fn bind_request(
        &self,
        operation: &OperationSpec,
        request: &Request<Bytes>,
    ) -> Result<CallFrame, BindError> {
        let params = operation
            .match_path(request.uri().path())
            .unwrap_or_else(Params::new);
        let envelope = RequestEnvelope::from_request(request, params)?;
        self.bind(operation, &envelope)
    }

    /// Projects a handler result through the operation's response shape.
    ///
    /// Operations without a declared response shape pass the value through.
    pub fn project(
        &self,
        operation: &OperationSpec,
        value: &Value,
    ) -> Result<Value, ProjectionError> {
        match operation.response() {
            Some(spec) => self.projector.project(value, spec),
            None => Ok(value.clone()),
        }
    }

    /// Projects a handler result and renders it with the operation's
    /// status code.
    ///
    /// A projection failure renders as a 500 response.
    pub fn respond(&self, operation: &OperationSpec, value: &Value) -> Response<Bytes> {
        let projected = match self.project(operation, value) {
            Ok(projected) => projected,
            Err(err) => return ErrorResponse::from_projection_error(&err).into_response(),
        };
        match JsonResponse::new(projected)
            .with_status(operation.status_code())
            .into_response()
        {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = %err, "response serialization failed");
                ErrorResponse::internal_error().into_response()
            }
        }
    }

    /// Runs one request through binding, `handler` and projection.
    ///
    /// A request that fails to bind never reaches `handler`.
    pub fn handle<F>(
        &self,
        operation: &OperationSpec,
        request: &Request<Bytes>,
        handler: F,
    ) -> Response<Bytes>
    where
        F: FnOnce(&CallFrame) -> Value,
    {
        match self.bind_request(operation, request) {
            Ok(frame) => self.respond(operation, &handler(&frame)),
            Err(err) => ErrorResponse::from_bind_error(&err).into_response(),
        }
    }
}
