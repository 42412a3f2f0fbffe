//! Bound handler arguments.

use crate::error::FrameError;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Coerced parameter values keyed by parameter name, in declaration order.
///
/// A frame is only ever produced by a successful bind, so it holds a value
/// for every declared parameter.
///
/// # Example
///
/// ```rust
/// use hypatia_extract::CallFrame;
/// use serde_json::json;
///
/// let mut frame = CallFrame::new();
/// frame.insert("item_id", json!(5));
/// frame.insert("q", json!(null));
///
/// let item_id: i64 = frame.get("item_id").unwrap();
/// assert_eq!(item_id, 5);
/// let q: Option<String> = frame.get("q").unwrap();
/// assert!(q.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CallFrame {
    values: IndexMap<String, Value>,
}

impl CallFrame {
    /// Creates an empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: IndexMap::with_capacity(capacity),
        }
    }

    /// Sets the value of a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Returns the raw coerced value of a parameter.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Deserializes the value of a parameter into `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, FrameError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| FrameError::Missing(name.to_string()))?;
        T::deserialize(value).map_err(|source| FrameError::Decode {
            name: name.to_string(),
            source,
        })
    }

    /// Returns true if a value is bound under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns an iterator over (name, value) pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Consumes the frame, returning its values as a JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.values.into_iter().collect())
    }
}
