//! Validation and declaration error types.
//!
//! Request-time failures are plain data: a [`ValidationError`] records where
//! the failure happened, what kind of failure it was and a human readable
//! message. Several of them are collected into [`ValidationErrors`], which is
//! what a rejected request reports back to the client.
//!
//! Declaration-time mistakes (a schema with two fields of the same name, an
//! invalid regular expression, ...) are [`SchemaError`]s and surface when a
//! schema or operation is built at startup.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// One step in a [`Location`]: an object key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object key or parameter source (`"body"`, `"query"`, ...).
    Key(String),
    /// Position inside a sequence.
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Address of a value inside a nested structure, from the root.
///
/// Serializes as a JSON array (`["body", "item", "tags", 2]`) and displays in
/// dotted form (`body.item.tags[2]`).
///
/// # Example
///
/// ```rust
/// use hypatia_schema::Location;
///
/// let loc = Location::root("body").child("item").child("tags").index(2);
/// assert_eq!(loc.to_string(), "body.item.tags[2]");
/// assert_eq!(loc.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Location(Vec<PathSegment>);

impl Location {
    /// Creates an empty location.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a location with a single leading key.
    #[must_use]
    pub fn root(key: impl Into<String>) -> Self {
        Self(vec![PathSegment::Key(key.into())])
    }

    /// Returns a new location extended with an object key.
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    /// Returns a new location extended with a sequence index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Returns the segments of this location.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if this is the empty location.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for Location {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required field is absent from its source.
    MissingRequired,
    /// The raw value cannot be parsed as the declared type.
    TypeCoercion,
    /// The coerced value violates a declared constraint.
    ConstraintViolation,
    /// The raw value's shape does not match a nested, sequence or mapping type.
    StructuralMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired => write!(f, "missing required"),
            Self::TypeCoercion => write!(f, "type coercion"),
            Self::ConstraintViolation => write!(f, "constraint violation"),
            Self::StructuralMismatch => write!(f, "structural mismatch"),
        }
    }
}

/// A single reported failure.
///
/// Serializes to the client-facing shape `{"location": [...], "message": "...", "type": "..."}`.
/// The kind and the offending input are kept for programmatic inspection
/// but are not part of the wire shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    location: Location,
    message: String,
    #[serde(rename = "type")]
    code: &'static str,
    #[serde(skip)]
    kind: ErrorKind,
    #[serde(skip)]
    input: Option<Value>,
}

impl ValidationError {
    /// Creates a new error.
    #[must_use]
    pub fn new(
        kind: ErrorKind,
        location: Location,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location,
            message: message.into(),
            code,
            kind,
            input: None,
        }
    }

    /// Creates an error for a required field that is absent.
    #[must_use]
    pub fn missing(location: Location) -> Self {
        Self::new(
            ErrorKind::MissingRequired,
            location,
            "value_error.missing",
            "field required",
        )
    }

    /// Creates a type coercion error.
    #[must_use]
    pub fn type_error(location: Location, code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeCoercion, location, code, message)
    }

    /// Creates a constraint violation error.
    #[must_use]
    pub fn constraint(location: Location, code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConstraintViolation, location, code, message)
    }

    /// Creates a structural mismatch error.
    #[must_use]
    pub fn structure(location: Location, code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StructuralMismatch, location, code, message)
    }

    /// Attaches the offending raw value.
    #[must_use]
    pub fn with_input(mut self, input: &Value) -> Self {
        self.input = Some(input.clone());
        self
    }

    /// Returns the location of the failure.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Returns the failure category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the machine readable error tag.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Returns the human readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending raw value, if recorded.
    #[must_use]
    pub fn input(&self) -> Option<&Value> {
        self.input.as_ref()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.location, self.message, self.code)
    }
}

/// Ordered collection of validation failures.
///
/// Empty means success. Serializes as a plain JSON array of
/// [`ValidationError`] objects in the order they were reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error.
    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Appends every error of another collection, keeping order.
    pub fn append(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    /// Returns true if no error was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns an iterator over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Returns the errors as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }

    /// Returns `Ok(value)` when empty, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl Extend<ValidationError> for ValidationErrors {
    fn extend<I: IntoIterator<Item = ValidationError>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Errors raised while declaring schemas and operations.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two fields of one schema share a name.
    #[error("duplicate field '{field}' in schema '{schema}'")]
    DuplicateField {
        /// Schema being declared.
        schema: String,
        /// Repeated field name.
        field: String,
    },

    /// A field embeds a recursive reference without a sequence or mapping in between.
    #[error("field '{field}' of schema '{schema}' embeds a recursive reference directly; wrap it in a list, set or map")]
    DirectSelfReference {
        /// Schema being declared.
        schema: String,
        /// Offending field.
        field: String,
    },

    /// A pattern constraint does not compile.
    #[error("invalid pattern '{pattern}' on field '{field}': {reason}")]
    InvalidPattern {
        /// Field carrying the pattern.
        field: String,
        /// Pattern source.
        pattern: String,
        /// Regex compiler message.
        reason: String,
    },

    /// A mapping key type is not a scalar.
    #[error("field '{field}' uses a non-scalar mapping key type")]
    UnsupportedKeyType {
        /// Offending field.
        field: String,
    },

    /// An enum declares no members.
    #[error("enum '{name}' declares no members")]
    EmptyEnum {
        /// Enum name.
        name: String,
    },

    /// A union declares no alternatives.
    #[error("field '{field}' declares a union without alternatives")]
    EmptyUnion {
        /// Offending field.
        field: String,
    },

    /// A path parameter does not appear in the operation's path template.
    #[error("path parameter '{name}' of operation '{operation}' is not in template '{template}'")]
    UnknownPathParameter {
        /// Operation being declared.
        operation: String,
        /// Parameter name.
        name: String,
        /// Path template.
        template: String,
    },

    /// Two parameters of an operation share an internal name.
    #[error("duplicate parameter '{name}' in operation '{operation}'")]
    DuplicateParameter {
        /// Operation being declared.
        operation: String,
        /// Repeated parameter name.
        name: String,
    },

    /// A path template is malformed.
    #[error("invalid path template '{template}': {reason}")]
    InvalidTemplate {
        /// Template source.
        template: String,
        /// What is wrong with it.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_location_display() {
        let loc = Location::root("item").child("tags").index(2);
        assert_eq!(loc.to_string(), "item.tags[2]");
        assert_eq!(Location::new().to_string(), "");
        assert_eq!(Location::new().index(0).child("name").to_string(), "[0].name");
    }

    #[test]
    fn test_location_serializes_as_array() {
        let loc = Location::root("body").child("images").index(1).child("url");
        assert_eq!(
            serde_json::to_value(&loc).unwrap(),
            json!(["body", "images", 1, "url"])
        );
    }

    #[test]
    fn test_location_from_iter() {
        let loc: Location = ["query", "q"].into_iter().collect();
        assert_eq!(loc, Location::root("query").child("q"));
    }

    #[test]
    fn test_missing_error_shape() {
        let err = ValidationError::missing(Location::root("query").child("needy"));
        assert_eq!(err.kind(), ErrorKind::MissingRequired);
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "location": ["query", "needy"],
                "message": "field required",
                "type": "value_error.missing"
            })
        );
    }

    #[test]
    fn test_input_is_not_serialized() {
        let err = ValidationError::type_error(
            Location::root("path").child("item_id"),
            "type_error.integer",
            "value is not a valid integer",
        )
        .with_input(&json!("foo"));

        assert_eq!(err.input(), Some(&json!("foo")));
        let wire = serde_json::to_value(&err).unwrap();
        assert!(wire.get("input").is_none());
        assert_eq!(wire["type"], "type_error.integer");
    }

    #[test]
    fn test_errors_collection() {
        let mut errors = ValidationErrors::new();
        assert!(errors.clone().into_result(1).is_ok());

        errors.push(ValidationError::missing(Location::root("a")));
        errors.push(ValidationError::missing(Location::root("b")));
        assert_eq!(errors.len(), 2);
        assert!(errors.to_string().starts_with("2 validation error(s)"));

        let err = errors.into_result(1).unwrap_err();
        let locations: Vec<String> = err.iter().map(|e| e.location().to_string()).collect();
        assert_eq!(locations, vec!["a", "b"]);
    }

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::DuplicateField {
            schema: "Item".to_string(),
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate field 'name' in schema 'Item'");
    }
}
