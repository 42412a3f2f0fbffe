//! Operation declarations.
//!
//! An [`OperationSpec`] is the static description of one endpoint: its
//! method and path template, the ordered parameters a handler takes, where
//! each one is read from, and the shape of its response. Operations are
//! declared once at startup and shared read-only.
//!
//! # Example
//!
//! ```rust
//! use hypatia_extract::{OperationSpec, Param, ParamSource};
//! use hypatia_schema::{FieldSpec, FieldType};
//! use http::Method;
//!
//! let op = OperationSpec::builder("read_item")
//!     .method(Method::GET)
//!     .path("/items/{item_id}")
//!     .param(Param::path(FieldSpec::new("item_id", FieldType::Int)))
//!     .param(Param::query(FieldSpec::new("q", FieldType::Str).optional()))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(op.params().len(), 2);
//! assert_eq!(op.params()[0].source(), ParamSource::Path);
//! ```

use crate::error::ParamSource;
use crate::path::PathTemplate;
use crate::projection::ProjectionSpec;
use hypatia_schema::{FieldSpec, Schema, SchemaError};
use http::{Method, StatusCode};
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

/// One declared handler parameter and the source it is read from.
#[derive(Debug, Clone)]
pub struct Param {
    field: FieldSpec,
    source: ParamSource,
    embed: bool,
}

impl Param {
    /// A parameter captured from the path. Always required.
    #[must_use]
    pub fn path(field: FieldSpec) -> Self {
        Self::new(ParamSource::Path, field)
    }

    /// A query string parameter.
    #[must_use]
    pub fn query(field: FieldSpec) -> Self {
        Self::new(ParamSource::Query, field)
    }

    /// A header parameter.
    #[must_use]
    pub fn header(field: FieldSpec) -> Self {
        Self::new(ParamSource::Header, field)
    }

    /// A body parameter.
    #[must_use]
    pub fn body(field: FieldSpec) -> Self {
        Self::new(ParamSource::Body, field)
    }

    /// A parameter read from `source`.
    #[must_use]
    pub fn new(source: ParamSource, field: FieldSpec) -> Self {
        Self {
            field,
            source,
            embed: false,
        }
    }

    /// Reads a lone body parameter from a key named after it rather than
    /// from the whole body.
    #[must_use]
    pub fn embed(mut self) -> Self {
        self.embed = true;
        self
    }

    /// Returns the field declaration.
    #[must_use]
    pub fn field(&self) -> &FieldSpec {
        &self.field
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.field.name()
    }

    /// Returns where the value is read from.
    #[must_use]
    pub fn source(&self) -> ParamSource {
        self.source
    }

    /// Returns true if the body value is read from a key named after the
    /// parameter.
    ///
    /// Set explicitly with [`Param::embed`], and for every body parameter
    /// of an operation that declares more than one.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.embed
    }

    /// The key the value is looked up under in its source.
    ///
    /// The alias wins if set. Otherwise header names have underscores
    /// turned into hyphens unless the field opts out.
    #[must_use]
    pub fn wire_name(&self) -> Cow<'_, str> {
        if let Some(alias) = self.field.alias_name() {
            return Cow::Borrowed(alias);
        }
        let name = self.field.name();
        if self.source == ParamSource::Header && self.field.converts_underscores() {
            return Cow::Owned(name.replace('_', "-"));
        }
        Cow::Borrowed(name)
    }
}

/// A declared endpoint.
#[derive(Debug, Clone)]
pub struct OperationSpec {
    operation_id: String,
    method: Method,
    path: PathTemplate,
    params: Vec<Param>,
    body_schema: Option<Arc<Schema>>,
    status_code: StatusCode,
    response: Option<ProjectionSpec>,
    summary: Option<String>,
    description: Option<String>,
    response_description: String,
    tags: Vec<String>,
    deprecated: bool,
}

impl OperationSpec {
    /// Starts declaring an operation.
    #[must_use]
    pub fn builder(operation_id: impl Into<String>) -> OperationBuilder {
        OperationBuilder::new(operation_id)
    }

    /// Returns the operation ID.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path template.
    #[must_use]
    pub fn path(&self) -> &PathTemplate {
        &self.path
    }

    /// Returns the parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name() == name)
    }

    /// The implicit schema of a body made of several embedded parameters.
    ///
    /// `None` when the operation has no body parameters or reads one
    /// parameter from the whole body.
    #[must_use]
    pub fn body_schema(&self) -> Option<&Arc<Schema>> {
        self.body_schema.as_ref()
    }

    /// Returns the success status code.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Returns the response shape, if declared.
    #[must_use]
    pub fn response(&self) -> Option<&ProjectionSpec> {
        self.response.as_ref()
    }

    /// Returns the summary.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the description of a successful response.
    #[must_use]
    pub fn response_description(&self) -> &str {
        &self.response_description
    }

    /// Returns the tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns true if the operation is deprecated.
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Matches a request path against this operation's template.
    #[must_use]
    pub fn match_path(&self, request_path: &str) -> Option<crate::Params> {
        self.path.matches(request_path)
    }
}

/// Builder for [`OperationSpec`].
#[derive(Debug)]
pub struct OperationBuilder {
    operation_id: String,
    method: Method,
    path: String,
    params: Vec<Param>,
    status_code: StatusCode,
    response: Option<ProjectionSpec>,
    summary: Option<String>,
    description: Option<String>,
    response_description: String,
    tags: Vec<String>,
    deprecated: bool,
}

impl OperationBuilder {
    /// Creates a new operation builder.
    #[must_use]
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            method: Method::GET,
            path: "/".to_string(),
            params: Vec::new(),
            status_code: StatusCode::OK,
            response: None,
            summary: None,
            description: None,
            response_description: "Successful Response".to_string(),
            tags: Vec::new(),
            deprecated: false,
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the path template.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Declares the next parameter.
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the success status code.
    #[must_use]
    pub fn status_code(mut self, status: StatusCode) -> Self {
        self.status_code = status;
        self
    }

    /// Sets the response shape.
    #[must_use]
    pub fn response(mut self, response: ProjectionSpec) -> Self {
        self.response = Some(response);
        self
    }

    /// Sets the summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the description of a successful response.
    #[must_use]
    pub fn response_description(mut self, description: impl Into<String>) -> Self {
        self.response_description = description.into();
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Marks the operation as deprecated.
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Checks the declaration and builds the operation.
    ///
    /// # Errors
    ///
    /// Fails on an invalid path template, a repeated parameter name, a path
    /// parameter the template does not declare, or any field declaration a
    /// schema build would reject.
    pub fn build(self) -> Result<OperationSpec, SchemaError> {
        let path = PathTemplate::parse(&self.path)?;

        let mut seen = HashSet::with_capacity(self.params.len());
        for param in &self.params {
            if !seen.insert(param.name()) {
                return Err(SchemaError::DuplicateParameter {
                    operation: self.operation_id.clone(),
                    name: param.name().to_string(),
                });
            }
            if param.source() == ParamSource::Path && !path.has_param(&param.wire_name()) {
                return Err(SchemaError::UnknownPathParameter {
                    operation: self.operation_id.clone(),
                    name: param.wire_name().into_owned(),
                    template: self.path.clone(),
                });
            }
            hypatia_schema::check_field(&self.operation_id, param.field())?;
        }

        let mut params = self.params;
        let body_count = params
            .iter()
            .filter(|p| p.source() == ParamSource::Body)
            .count();
        let composite = body_count > 1
            || params
                .iter()
                .any(|p| p.source() == ParamSource::Body && p.is_embedded());

        let body_schema = if composite {
            for param in params.iter_mut().filter(|p| p.source() == ParamSource::Body) {
                param.embed = true;
            }
            let schema = Schema::builder(format!("Body_{}", self.operation_id))
                .fields(
                    params
                        .iter()
                        .filter(|p| p.source() == ParamSource::Body)
                        .map(|p| p.field().clone()),
                )
                .build()?;
            Some(schema)
        } else {
            None
        };

        tracing::debug!(
            operation_id = %self.operation_id,
            method = %self.method,
            path = %path,
            params = params.len(),
            "operation declared"
        );

        Ok(OperationSpec {
            operation_id: self.operation_id,
            method: self.method,
            path,
            params,
            body_schema,
            status_code: self.status_code,
            response: self.response,
            summary: self.summary,
            description: self.description,
            response_description: self.response_description,
            tags: self.tags,
            deprecated: self.deprecated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypatia_schema::FieldType;

    fn item() -> Arc<Schema> {
        Schema::builder("Item")
            .field(FieldSpec::new("name", FieldType::Str))
            .field(FieldSpec::new("price", FieldType::Float))
            .build()
            .unwrap()
    }

    #[test]
    fn test_wire_names() {
        let header = Param::header(FieldSpec::new("user_agent", FieldType::Str));
        assert_eq!(header.wire_name(), "user-agent");

        let literal = Param::header(FieldSpec::new("strange_header", FieldType::Str).convert_underscores(false));
        assert_eq!(literal.wire_name(), "strange_header");

        let aliased = Param::query(FieldSpec::new("q", FieldType::Str).alias("item-query"));
        assert_eq!(aliased.wire_name(), "item-query");

        let query = Param::query(FieldSpec::new("skip_count", FieldType::Int));
        assert_eq!(query.wire_name(), "skip_count");
    }

    #[test]
    fn test_builder_defaults() {
        let op = OperationSpec::builder("root").build().unwrap();
        assert_eq!(op.operation_id(), "root");
        assert_eq!(op.method(), &Method::GET);
        assert_eq!(op.path().as_str(), "/");
        assert_eq!(op.status_code(), StatusCode::OK);
        assert_eq!(op.response_description(), "Successful Response");
        assert!(op.response().is_none());
        assert!(!op.is_deprecated());
    }

    #[test]
    fn test_builder_metadata() {
        let op = OperationSpec::builder("create_item")
            .method(Method::POST)
            .path("/items/")
            .status_code(StatusCode::CREATED)
            .summary("Create an item")
            .description("Create an item with all the information")
            .response_description("The created item")
            .tag("items")
            .deprecated()
            .build()
            .unwrap();
        assert_eq!(op.status_code(), StatusCode::CREATED);
        assert_eq!(op.summary(), Some("Create an item"));
        assert_eq!(op.description(), Some("Create an item with all the information"));
        assert_eq!(op.response_description(), "The created item");
        assert_eq!(op.tags(), &["items".to_string()]);
        assert!(op.is_deprecated());
    }

    #[test]
    fn test_unknown_path_param_rejected() {
        let err = OperationSpec::builder("read_item")
            .path("/items/{item_id}")
            .param(Param::path(FieldSpec::new("id", FieldType::Int)))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownPathParameter { ref name, .. } if name == "id"));
    }

    #[test]
    fn test_duplicate_param_rejected() {
        let err = OperationSpec::builder("read_items")
            .param(Param::query(FieldSpec::new("q", FieldType::Str)))
            .param(Param::header(FieldSpec::new("q", FieldType::Str)))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateParameter { .. }));
    }

    #[test]
    fn test_invalid_field_rejected() {
        let err = OperationSpec::builder("read_items")
            .param(Param::query(FieldSpec::new("q", FieldType::Str).pattern("(")))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn test_single_body_param_reads_whole_body() {
        let op = OperationSpec::builder("create_item")
            .param(Param::body(FieldSpec::new("item", FieldType::model(&item()))))
            .build()
            .unwrap();
        assert!(op.body_schema().is_none());
        assert!(!op.param("item").unwrap().is_embedded());
    }

    #[test]
    fn test_embedded_body_param_gets_composite_schema() {
        let op = OperationSpec::builder("update_item")
            .param(Param::body(FieldSpec::new("item", FieldType::model(&item()))).embed())
            .build()
            .unwrap();
        let schema = op.body_schema().unwrap();
        assert_eq!(schema.name(), "Body_update_item");
        assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["item"]);
    }

    #[test]
    fn test_multiple_body_params_merge() {
        let user = Schema::builder("User")
            .field(FieldSpec::new("username", FieldType::Str))
            .build()
            .unwrap();
        let op = OperationSpec::builder("update_item")
            .path("/items/{item_id}")
            .param(Param::path(FieldSpec::new("item_id", FieldType::Int)))
            .param(Param::body(FieldSpec::new("item", FieldType::model(&item()))))
            .param(Param::body(FieldSpec::new("user", FieldType::model(&user))))
            .param(Param::body(FieldSpec::new("importance", FieldType::Int).gt(0.0)))
            .build()
            .unwrap();

        let schema = op.body_schema().unwrap();
        assert_eq!(
            schema.field_names().collect::<Vec<_>>(),
            vec!["item", "user", "importance"]
        );
        assert!(op
            .params()
            .iter()
            .filter(|p| p.source() == ParamSource::Body)
            .all(Param::is_embedded));
        assert!(op.match_path("/items/5").is_some());
    }
}
