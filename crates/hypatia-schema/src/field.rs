//! Field declarations: declared types and per-field options.

use crate::constraint::{Constraint, ConstraintSet, Pattern};
use crate::schema::Schema;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Function returning a schema that may not exist yet while it is being declared.
///
/// Used for recursive schemas; see [`FieldType::Recursive`].
pub type SchemaFn = fn() -> Arc<Schema>;

/// A closed set of allowed string literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    name: String,
    members: Vec<String>,
}

impl EnumType {
    /// Creates an enum type.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the enum name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the allowed members in declaration order.
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Returns true if `candidate` is a member.
    #[must_use]
    pub fn contains(&self, candidate: &str) -> bool {
        self.members.iter().any(|m| m == candidate)
    }
}

/// The declared type of a field.
#[derive(Clone)]
pub enum FieldType {
    /// Any value, passed through unchanged.
    Any,
    /// String.
    Str,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean.
    Bool,
    /// String holding an e-mail address.
    Email,
    /// String holding an absolute http(s) URL.
    Url,
    /// One of a closed set of string literals.
    Enum(EnumType),
    /// A nested schema.
    Model(Arc<Schema>),
    /// A schema resolved on use, for self-referencing declarations.
    ///
    /// Only allowed below a [`FieldType::List`], [`FieldType::Set`] or
    /// [`FieldType::Map`], which keeps the depth of any coerced value finite.
    Recursive(SchemaFn),
    /// Ordered sequence of values of one type.
    List(Box<FieldType>),
    /// Sequence de-duplicated after coercion, first occurrence kept.
    Set(Box<FieldType>),
    /// Mapping from scalar keys to values of one type.
    Map(Box<FieldType>, Box<FieldType>),
    /// First alternative that coerces without errors.
    Union(Vec<FieldType>),
}

impl FieldType {
    /// Sequence of `item`.
    #[must_use]
    pub fn list(item: FieldType) -> Self {
        Self::List(Box::new(item))
    }

    /// De-duplicated sequence of `item`.
    #[must_use]
    pub fn set(item: FieldType) -> Self {
        Self::Set(Box::new(item))
    }

    /// Mapping from `key` to `value`.
    #[must_use]
    pub fn map(key: FieldType, value: FieldType) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// Nested schema.
    #[must_use]
    pub fn model(schema: &Arc<Schema>) -> Self {
        Self::Model(Arc::clone(schema))
    }

    /// Recursive schema reference.
    #[must_use]
    pub fn recursive(schema: SchemaFn) -> Self {
        Self::Recursive(schema)
    }

    /// Enumeration of string literals.
    #[must_use]
    pub fn enumeration<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(EnumType::new(name, members))
    }

    /// Union of alternatives tried in order.
    #[must_use]
    pub fn union(alternatives: impl IntoIterator<Item = FieldType>) -> Self {
        Self::Union(alternatives.into_iter().collect())
    }

    /// Returns true for list and set types.
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_))
    }

    /// Returns true for single-value types.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Str | Self::Int | Self::Float | Self::Bool | Self::Email | Self::Url | Self::Enum(_)
        )
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Str => write!(f, "str"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Bool => write!(f, "bool"),
            Self::Email => write!(f, "email"),
            Self::Url => write!(f, "url"),
            Self::Enum(e) => write!(f, "{}", e.name()),
            Self::Model(schema) => write!(f, "{}", schema.name()),
            Self::Recursive(_) => write!(f, "recursive"),
            Self::List(item) => write!(f, "list[{item}]"),
            Self::Set(item) => write!(f, "set[{item}]"),
            Self::Map(k, v) => write!(f, "map[{k}, {v}]"),
            Self::Union(alternatives) => {
                write!(f, "union[")?;
                for (i, alt) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{alt}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A named, typed field of a schema or an operation.
///
/// Fields are required by default. Declaring a default or calling
/// [`FieldSpec::optional`] makes them optional.
///
/// # Example
///
/// ```rust
/// use hypatia_schema::{FieldSpec, FieldType};
/// use serde_json::json;
///
/// let q = FieldSpec::new("q", FieldType::Str)
///     .default(json!("fixedquery"))
///     .min_length(3);
/// assert!(!q.is_required());
/// assert_eq!(q.default_value(), Some(&json!("fixedquery")));
/// ```
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    ty: FieldType,
    required: bool,
    nullable: bool,
    default: Option<Value>,
    alias: Option<String>,
    convert_underscores: bool,
    constraints: ConstraintSet,
    title: Option<String>,
    description: Option<String>,
}

impl FieldSpec {
    /// Creates a required field.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            nullable: false,
            default: None,
            alias: None,
            convert_underscores: true,
            constraints: ConstraintSet::new(),
            title: None,
            description: None,
        }
    }

    /// Makes the field optional and nullable, defaulting to `null`.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self.nullable = true;
        self.default = Some(Value::Null);
        self
    }

    /// Makes the field optional with the given default.
    #[must_use]
    pub fn default(mut self, value: Value) -> Self {
        self.required = false;
        self.default = Some(value);
        self
    }

    /// Accepts an explicit `null` without making the field optional.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the external name used in the request or response.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Controls underscore-to-hyphen conversion for header lookup.
    #[must_use]
    pub fn convert_underscores(mut self, convert: bool) -> Self {
        self.convert_underscores = convert;
        self
    }

    /// Adds a constraint.
    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Minimum length.
    #[must_use]
    pub fn min_length(self, len: usize) -> Self {
        self.constraint(Constraint::MinLength(len))
    }

    /// Maximum length.
    #[must_use]
    pub fn max_length(self, len: usize) -> Self {
        self.constraint(Constraint::MaxLength(len))
    }

    /// Regular expression the value must match.
    #[must_use]
    pub fn pattern(self, pattern: impl Into<String>) -> Self {
        self.constraint(Constraint::Pattern(Pattern::new(pattern)))
    }

    /// Exclusive lower bound.
    #[must_use]
    pub fn gt(self, bound: f64) -> Self {
        self.constraint(Constraint::Gt(bound))
    }

    /// Inclusive lower bound.
    #[must_use]
    pub fn ge(self, bound: f64) -> Self {
        self.constraint(Constraint::Ge(bound))
    }

    /// Exclusive upper bound.
    #[must_use]
    pub fn lt(self, bound: f64) -> Self {
        self.constraint(Constraint::Lt(bound))
    }

    /// Inclusive upper bound.
    #[must_use]
    pub fn le(self, bound: f64) -> Self {
        self.constraint(Constraint::Le(bound))
    }

    /// Marks the field deprecated (documentation only).
    #[must_use]
    pub fn deprecated(self) -> Self {
        self.constraint(Constraint::Deprecated)
    }

    /// Sets a documentation title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a documentation description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Internal name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name used on the wire: the alias if set, otherwise the internal name.
    #[must_use]
    pub fn external_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// The declared type.
    #[must_use]
    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// Whether the field must be present.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether an explicit `null` is accepted.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Value used when the field is optional and absent.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// The alias, if any.
    #[must_use]
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Whether header lookup converts underscores to hyphens.
    #[must_use]
    pub fn converts_underscores(&self) -> bool {
        self.convert_underscores
    }

    /// The constraint set.
    #[must_use]
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// Documentation title.
    #[must_use]
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Documentation description.
    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the field is marked deprecated.
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.constraints.is_deprecated()
    }
}
