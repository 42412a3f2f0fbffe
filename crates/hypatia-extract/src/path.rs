//! Path templates and matched path parameters.
//!
//! A [`PathTemplate`] is parsed from a route pattern such as
//! `/items/{item_id}` and matched against concrete request paths, yielding
//! the captured [`Params`]. A placeholder written `{name:path}` captures the
//! remainder of the path, slashes included, and must come last.
//!
//! Captured values are kept as they appear in the request path, still
//! percent-encoded. [`Params::decoded`] yields the decoded value.
//!
//! ```rust
//! use hypatia_extract::PathTemplate;
//!
//! let template = PathTemplate::parse("/files/{file_path:path}").unwrap();
//! let params = template.matches("/files//home/johndoe/my%20file.txt").unwrap();
//! assert_eq!(params.get("file_path"), Some("/home/johndoe/my%20file.txt"));
//! assert_eq!(
//!     params.decoded("file_path").unwrap().unwrap(),
//!     "/home/johndoe/my file.txt"
//! );
//! ```

use hypatia_schema::SchemaError;
use percent_encoding::percent_decode_str;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::str::Utf8Error;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Path parameters captured by a template match.
///
/// Stored as (name, value) pairs with small-vector optimization; most
/// routes capture one to four parameters.
///
/// # Example
///
/// ```rust
/// use hypatia_extract::Params;
///
/// let mut params = Params::new();
/// params.push("item_id", "5");
/// params.push("model_name", "alexnet");
///
/// assert_eq!(params.get("item_id"), Some("5"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a params set with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: SmallVec::with_capacity(capacity),
        }
    }

    /// Adds a parameter to the set.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the raw, percent-encoded value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the percent-decoded value for a parameter by name.
    ///
    /// The inner result is an error when the decoded bytes are not UTF-8.
    pub fn decoded(&self, name: &str) -> Option<Result<Cow<'_, str>, Utf8Error>> {
        self.get(name).map(|raw| percent_decode_str(raw).decode_utf8())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    // `{name:path}`: the rest of the path.
    Rest(String),
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parses a route pattern.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidTemplate`] for unbalanced braces, empty
    /// or repeated placeholder names, unknown converters, or a `path`
    /// placeholder that is not the last segment.
    pub fn parse(template: &str) -> Result<Self, SchemaError> {
        let invalid = |reason: String| SchemaError::InvalidTemplate {
            template: template.to_string(),
            reason,
        };

        let raw: Vec<&str> = split_segments(template).collect();

        let mut segments = Vec::with_capacity(raw.len());
        for (i, segment) in raw.iter().enumerate() {
            let Some(inner) = segment.strip_prefix('{') else {
                if segment.contains(['{', '}']) {
                    return Err(invalid(format!("malformed segment '{segment}'")));
                }
                segments.push(Segment::Literal((*segment).to_string()));
                continue;
            };
            let inner = inner
                .strip_suffix('}')
                .ok_or_else(|| invalid(format!("unclosed placeholder '{segment}'")))?;

            let (name, converter) = match inner.split_once(':') {
                Some((name, converter)) => (name, Some(converter)),
                None => (inner, None),
            };
            if name.is_empty() || name.contains(['{', '}']) {
                return Err(invalid(format!("invalid placeholder name in '{segment}'")));
            }
            let seen = segments.iter().any(|s| match s {
                Segment::Param(n) | Segment::Rest(n) => n == name,
                Segment::Literal(_) => false,
            });
            if seen {
                return Err(invalid(format!("placeholder '{name}' appears twice")));
            }

            match converter {
                None => segments.push(Segment::Param(name.to_string())),
                Some("path") if i + 1 == raw.len() => segments.push(Segment::Rest(name.to_string())),
                Some("path") => {
                    return Err(invalid(format!("'{name}:path' must be the last segment")));
                }
                Some(other) => return Err(invalid(format!("unknown converter '{other}'"))),
            }
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of appearance.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) | Segment::Rest(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Returns true if the template declares a placeholder with this name.
    #[must_use]
    pub fn has_param(&self, name: &str) -> bool {
        self.param_names().any(|n| n == name)
    }

    /// Matches a request path, returning the captured parameters.
    ///
    /// Segments are compared exactly, so a trailing slash is significant.
    /// A plain placeholder never captures an empty segment. A `path`
    /// placeholder captures the raw remainder, empty segments included.
    #[must_use]
    pub fn matches(&self, request_path: &str) -> Option<Params> {
        let request: Vec<&str> = split_segments(request_path).collect();

        let has_rest = matches!(self.segments.last(), Some(Segment::Rest(_)));
        let fixed = self.segments.len() - usize::from(has_rest);
        if request.len() < fixed || (!has_rest && request.len() != fixed) {
            return None;
        }

        let mut params = Params::with_capacity(self.segments.len());
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(literal) => {
                    if literal != request[i] {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if request[i].is_empty() {
                        return None;
                    }
                    params.push(name.as_str(), request[i]);
                }
                Segment::Rest(name) => {
                    if request.len() == i {
                        return None;
                    }
                    params.push(name.as_str(), request[i..].join("/"));
                }
            }
        }
        Some(params)
    }
}

// `/a//b/` splits into `a`, ``, `b`, ``: only the leading slash is dropped.
fn split_segments(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn encoded_segment_decodes_to_original(value in "[^/]{1,16}") {
            let template = PathTemplate::parse("/users/{user_id}").unwrap();
            let encoded = utf8_percent_encode(&value, NON_ALPHANUMERIC).to_string();
            let params = template.matches(&format!("/users/{encoded}")).unwrap();
            prop_assert_eq!(params.get("user_id"), Some(encoded.as_str()));
            prop_assert_eq!(params.decoded("user_id").unwrap().unwrap(), value);
        }

        #[test]
        fn path_converter_captures_raw_remainder(
            segments in prop::collection::vec("[a-z.]{0,4}", 1..6),
        ) {
            let template = PathTemplate::parse("/files/{file_path:path}").unwrap();
            let rest = segments.join("/");
            let params = template.matches(&format!("/files/{rest}")).unwrap();
            prop_assert_eq!(params.get("file_path"), Some(rest.as_str()));
        }
    }

    #[test]
    fn test_params_push_and_get() {
        let mut params = Params::new();
        assert!(params.is_empty());
        params.push("id", "123");
        params.push("name", "alice");

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.get("name"), Some("alice"));
        assert_eq!(params.get("unknown"), None);
    }

    #[test]
    fn test_params_from_iter() {
        let params: Params = [("a", "1"), ("b", "2")].into_iter().collect();
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_match_simple_placeholder() {
        let template = PathTemplate::parse("/items/{item_id}").unwrap();
        let params = template.matches("/items/42").unwrap();
        assert_eq!(params.get("item_id"), Some("42"));

        assert!(template.matches("/items").is_none());
        assert!(template.matches("/items/42/extra").is_none());
        assert!(template.matches("/users/42").is_none());
    }

    #[test]
    fn test_match_multiple_placeholders() {
        let template = PathTemplate::parse("/users/{user_id}/items/{item_id}").unwrap();
        let params = template.matches("/users/3/items/foo").unwrap();
        assert_eq!(params.get("user_id"), Some("3"));
        assert_eq!(params.get("item_id"), Some("foo"));
        assert_eq!(template.param_names().collect::<Vec<_>>(), vec!["user_id", "item_id"]);
    }

    #[test]
    fn test_path_converter_captures_rest() {
        let template = PathTemplate::parse("/files/{file_path:path}").unwrap();
        assert!(template.has_param("file_path"));

        let params = template.matches("/files/home/johndoe/myfile.txt").unwrap();
        assert_eq!(params.get("file_path"), Some("home/johndoe/myfile.txt"));

        let params = template.matches("/files/readme").unwrap();
        assert_eq!(params.get("file_path"), Some("readme"));

        assert!(template.matches("/files").is_none());
    }

    #[test]
    fn test_path_converter_keeps_empty_segments() {
        let template = PathTemplate::parse("/files/{file_path:path}").unwrap();
        let params = template.matches("/files//home/johndoe/myfile.txt").unwrap();
        assert_eq!(params.get("file_path"), Some("/home/johndoe/myfile.txt"));

        let params = template.matches("/files/a//b/").unwrap();
        assert_eq!(params.get("file_path"), Some("a//b/"));
    }

    #[test]
    fn test_trailing_slash_is_significant() {
        let template = PathTemplate::parse("/items/").unwrap();
        assert!(template.matches("/items/").is_some());
        assert!(template.matches("/items").is_none());

        let template = PathTemplate::parse("/items/{item_id}").unwrap();
        assert!(template.matches("/items/").is_none());
        assert!(template.matches("/items//").is_none());
        assert!(template.matches("/items/5/").is_none());
    }

    #[test]
    fn test_decoded_values() {
        let template = PathTemplate::parse("/users/{user_id}").unwrap();
        let params = template.matches("/users/john%20doe").unwrap();
        assert_eq!(params.get("user_id"), Some("john%20doe"));
        assert_eq!(params.decoded("user_id").unwrap().unwrap(), "john doe");

        let params = template.matches("/users/%FF").unwrap();
        assert!(params.decoded("user_id").unwrap().is_err());
        assert!(params.decoded("unknown").is_none());
    }

    #[test]
    fn test_invalid_templates() {
        for bad in [
            "/items/{item_id",
            "/items/{}",
            "/items/{id}/{id}",
            "/files/{p:path}/tail",
            "/items/{id:uuid}",
            "/items/x{id}",
        ] {
            let err = PathTemplate::parse(bad).unwrap_err();
            assert!(matches!(err, SchemaError::InvalidTemplate { .. }), "{bad}");
        }
    }

    #[test]
    fn test_root_template() {
        let template = PathTemplate::parse("/").unwrap();
        assert!(template.matches("/").unwrap().is_empty());
        assert!(template.matches("/x").is_none());
        assert_eq!(template.to_string(), "/");
    }
}
