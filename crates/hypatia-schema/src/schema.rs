//! Schemas: named, ordered field tables.
//!
//! A schema is declared once at startup through [`SchemaBuilder`], checked,
//! and then shared read-only behind an [`Arc`] by every request that binds
//! or projects through it.
//!
//! # Composition
//!
//! A schema can start from the fields of another one with
//! [`SchemaBuilder::extend`]. The base table is copied at declaration time;
//! redeclaring an inherited field replaces it in place, keeping its
//! position.
//!
//! ```rust
//! use hypatia_schema::{FieldSpec, FieldType, Schema};
//!
//! let base = Schema::builder("UserBase")
//!     .field(FieldSpec::new("username", FieldType::Str))
//!     .field(FieldSpec::new("email", FieldType::Email))
//!     .build()
//!     .unwrap();
//!
//! let user_in = Schema::builder("UserIn")
//!     .extend(&base)
//!     .field(FieldSpec::new("password", FieldType::Str))
//!     .build()
//!     .unwrap();
//!
//! let names: Vec<_> = user_in.field_names().collect();
//! assert_eq!(names, vec!["username", "email", "password"]);
//! ```

use crate::error::SchemaError;
use crate::field::{FieldSpec, FieldType};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A named data shape.
#[derive(Debug)]
pub struct Schema {
    name: String,
    fields: Vec<FieldSpec>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Starts declaring a schema.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// Schema identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by internal name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Internal field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldSpec::name)
    }

    /// Returns true if a field with this internal name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

/// Builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldSpec>,
    inherited: HashSet<String>,
    duplicate: Option<String>,
}

impl SchemaBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            inherited: HashSet::new(),
            duplicate: None,
        }
    }

    /// Copies every field of `base` into this schema.
    #[must_use]
    pub fn extend(mut self, base: &Schema) -> Self {
        for field in base.fields() {
            self.inherited.insert(field.name().to_string());
            match self.position(field.name()) {
                Some(i) => self.fields[i] = field.clone(),
                None => self.fields.push(field.clone()),
            }
        }
        self
    }

    /// Declares a field. Redeclaring an inherited field overrides it.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        match self.position(field.name()) {
            Some(i) if self.inherited.remove(field.name()) => self.fields[i] = field,
            Some(_) => {
                self.duplicate.get_or_insert_with(|| field.name().to_string());
            }
            None => self.fields.push(field),
        }
        self
    }

    /// Declares several fields.
    #[must_use]
    pub fn fields(self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        fields.into_iter().fold(self, SchemaBuilder::field)
    }

    /// Checks the declaration and freezes it.
    ///
    /// # Errors
    ///
    /// Fails on duplicate field names, direct recursive references, invalid
    /// patterns, non-scalar mapping keys and empty enums or unions.
    pub fn build(self) -> Result<Arc<Schema>, SchemaError> {
        if let Some(field) = self.duplicate {
            return Err(SchemaError::DuplicateField {
                schema: self.name,
                field,
            });
        }

        for field in &self.fields {
            check_field(&self.name, field)?;
        }

        let index = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name().to_string(), i))
            .collect();

        tracing::trace!(schema = %self.name, fields = self.fields.len(), "schema declared");

        Ok(Arc::new(Schema {
            name: self.name,
            fields: self.fields,
            index,
        }))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }
}

/// Checks one field declaration of `schema`.
pub(crate) fn check_field(schema: &str, field: &FieldSpec) -> Result<(), SchemaError> {
    field.constraints().compile_check(field.name())?;
    check_type(schema, field.name(), field.ty(), false)
}

fn check_type(
    schema: &str,
    field: &str,
    ty: &FieldType,
    behind_indirection: bool,
) -> Result<(), SchemaError> {
    match ty {
        FieldType::Recursive(_) if !behind_indirection => Err(SchemaError::DirectSelfReference {
            schema: schema.to_string(),
            field: field.to_string(),
        }),
        FieldType::Enum(e) if e.members().is_empty() => Err(SchemaError::EmptyEnum {
            name: e.name().to_string(),
        }),
        FieldType::List(item) | FieldType::Set(item) => check_type(schema, field, item, true),
        FieldType::Map(key, value) => {
            if !key.is_scalar() {
                return Err(SchemaError::UnsupportedKeyType {
                    field: field.to_string(),
                });
            }
            check_type(schema, field, value, true)
        }
        FieldType::Union(alternatives) => {
            if alternatives.is_empty() {
                return Err(SchemaError::EmptyUnion {
                    field: field.to_string(),
                });
            }
            alternatives
                .iter()
                .try_for_each(|alt| check_type(schema, field, alt, behind_indirection))
        }
        _ => Ok(()),
    }
}
