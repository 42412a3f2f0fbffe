//! The request envelope handed to the binder.
//!
//! A [`RequestEnvelope`] holds the four raw parameter sources of one
//! request: captured path parameters, the query string as ordered pairs,
//! the header map and the decoded JSON body. It can be assembled by hand
//! with [`RequestEnvelope::builder`] or taken from an
//! [`http::Request`] with [`RequestEnvelope::from_request`].

use crate::error::BindError;
use crate::path::Params;
use bytes::Bytes;
use hypatia_schema::{Location, ValidationError};
use http::{header, HeaderMap, HeaderName, HeaderValue, Request};
use serde_json::Value;

/// Query string parameters as ordered key/value pairs.
///
/// Keys may repeat; `?q=foo&q=bar` keeps both values in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryPairs {
    pairs: Vec<(String, String)>,
}

impl QueryPairs {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a URL-encoded query string (without the leading `?`).
    pub fn parse(query: &str) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(query)?;
        Ok(Self { pairs })
    }

    /// Appends a pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Every value for `key`, in order of appearance.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The last value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns an iterator over the pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Raw request data, one field per parameter source.
#[derive(Debug, Clone, Default)]
pub struct RequestEnvelope {
    path_params: Params,
    query: QueryPairs,
    headers: HeaderMap,
    body: Option<Value>,
}

impl RequestEnvelope {
    /// Creates an envelope from its parts.
    #[must_use]
    pub fn new(
        path_params: Params,
        query: QueryPairs,
        headers: HeaderMap,
        body: Option<Value>,
    ) -> Self {
        Self {
            path_params,
            query,
            headers,
            body,
        }
    }

    /// Starts building an envelope by hand.
    #[must_use]
    pub fn builder() -> RequestEnvelopeBuilder {
        RequestEnvelopeBuilder::default()
    }

    /// Takes the query string, headers and body from an HTTP request.
    ///
    /// `path_params` are the parameters captured when the request was
    /// routed, for example by [`PathTemplate::matches`](crate::PathTemplate::matches).
    /// An empty body becomes an absent body.
    ///
    /// # Errors
    ///
    /// A malformed query string or body is reported as a validation error
    /// at `query` or `body`. A non-empty body with a Content-Type other
    /// than JSON is rejected as [`BindError::UnsupportedMediaType`].
    pub fn from_request(request: &Request<Bytes>, path_params: Params) -> Result<Self, BindError> {
        let query = QueryPairs::parse(request.uri().query().unwrap_or("")).map_err(|e| {
            ValidationError::structure(
                Location::root("query"),
                "value_error.query",
                format!("malformed query string: {e}"),
            )
        })?;

        let body = decode_body(request.headers(), request.body())?;

        Ok(Self {
            path_params,
            query,
            headers: request.headers().clone(),
            body,
        })
    }

    /// Returns the captured path parameters.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    /// Returns the query pairs.
    #[must_use]
    pub fn query(&self) -> &QueryPairs {
        &self.query
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the decoded body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

fn decode_body(headers: &HeaderMap, bytes: &Bytes) -> Result<Option<Value>, BindError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        let content_type = content_type.to_str().unwrap_or_default();
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        let is_json = essence.eq_ignore_ascii_case("application/json")
            || essence.to_ascii_lowercase().ends_with("+json");
        if !is_json {
            return Err(BindError::UnsupportedMediaType {
                content_type: content_type.to_string(),
            });
        }
    }

    serde_json::from_slice(bytes).map(Some).map_err(|e| {
        ValidationError::structure(
            Location::root("body"),
            "value_error.jsondecode",
            format!("JSON decode error: {e}"),
        )
        .into()
    })
}

/// Builder for [`RequestEnvelope`].
///
/// # Example
///
/// ```rust
/// use hypatia_extract::RequestEnvelope;
/// use serde_json::json;
///
/// let envelope = RequestEnvelope::builder()
///     .path_param("item_id", "5")
///     .query_string("q=foo&q=bar")
///     .header("user-agent", "curl/8.0")
///     .body(json!({"name": "Foo"}))
///     .build();
///
/// assert_eq!(envelope.path_params().get("item_id"), Some("5"));
/// assert_eq!(envelope.query().get_all("q").collect::<Vec<_>>(), vec!["foo", "bar"]);
/// assert!(envelope.body().is_some());
/// ```
#[derive(Debug, Default)]
pub struct RequestEnvelopeBuilder {
    path_params: Params,
    query: QueryPairs,
    headers: HeaderMap,
    body: Option<Value>,
}

impl RequestEnvelopeBuilder {
    /// Adds a captured path parameter.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push(name, value);
        self
    }

    /// Sets the captured path parameters.
    #[must_use]
    pub fn path_params(mut self, params: Params) -> Self {
        self.path_params = params;
        self
    }

    /// Adds one query pair.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push(key, value);
        self
    }

    /// Adds every pair of a URL-encoded query string.
    ///
    /// A string that does not decode is logged and ignored.
    #[must_use]
    pub fn query_string(mut self, query: &str) -> Self {
        match QueryPairs::parse(query) {
            Ok(parsed) => self.query.pairs.extend(parsed.pairs),
            Err(e) => tracing::warn!(error = %e, "ignoring malformed query string"),
        }
        self
    }

    /// Appends a header. Invalid names or values are logged and ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::warn!(header = name, "ignoring invalid header"),
        }
        self
    }

    /// Sets the header map.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the decoded body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Builds the envelope.
    #[must_use]
    pub fn build(self) -> RequestEnvelope {
        RequestEnvelope {
            path_params: self.path_params,
            query: self.query,
            headers: self.headers,
            body: self.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypatia_schema::ErrorKind;
    use http::Method;
    use serde_json::json;

    fn request(uri: &str, content_type: Option<&str>, body: &'static [u8]) -> Request<Bytes> {
        let mut builder = Request::builder().method(Method::POST).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder.body(Bytes::from_static(body)).unwrap()
    }

    #[test]
    fn test_query_pairs_keep_order_and_repeats() {
        let query = QueryPairs::parse("q=foo&limit=10&q=bar").unwrap();
        assert_eq!(query.len(), 3);
        assert_eq!(query.get_all("q").collect::<Vec<_>>(), vec!["foo", "bar"]);
        assert_eq!(query.get("q"), Some("bar"));
        assert_eq!(query.get("limit"), Some("10"));
        assert_eq!(query.get("skip"), None);
    }

    #[test]
    fn test_query_value_outlives_key() {
        let query = QueryPairs::parse("q=foo&q=bar").unwrap();
        let last = {
            let key = String::from("q");
            query.get(&key)
        };
        assert_eq!(last, Some("bar"));
    }

    #[test]
    fn test_query_pairs_decode() {
        let query = QueryPairs::parse("item-query=hello%20world&x=a+b").unwrap();
        assert_eq!(query.get("item-query"), Some("hello world"));
        assert_eq!(query.get("x"), Some("a b"));
    }

    #[test]
    fn test_from_request_json_body() {
        let req = request(
            "/items/5?q=foo",
            Some("application/json"),
            br#"{"name": "Foo", "price": 3.5}"#,
        );
        let mut params = Params::new();
        params.push("item_id", "5");

        let envelope = RequestEnvelope::from_request(&req, params).unwrap();
        assert_eq!(envelope.path_params().get("item_id"), Some("5"));
        assert_eq!(envelope.query().get("q"), Some("foo"));
        assert_eq!(envelope.body(), Some(&json!({"name": "Foo", "price": 3.5})));
        assert!(envelope.headers().contains_key(header::CONTENT_TYPE));
    }

    #[test]
    fn test_from_request_empty_body_is_absent() {
        let req = request("/items", None, b"");
        let envelope = RequestEnvelope::from_request(&req, Params::new()).unwrap();
        assert!(envelope.body().is_none());
        assert!(envelope.query().is_empty());
    }

    #[test]
    fn test_from_request_malformed_json() {
        let req = request("/items", Some("application/json"), b"{\"name\": ");
        let err = RequestEnvelope::from_request(&req, Params::new()).unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.len(), 1);
        let first = &errors.as_slice()[0];
        assert_eq!(first.location().to_string(), "body");
        assert_eq!(first.kind(), ErrorKind::StructuralMismatch);
        assert_eq!(first.code(), "value_error.jsondecode");
    }

    #[test]
    fn test_from_request_rejects_non_json_media_type() {
        let req = request("/items", Some("text/plain"), b"hello");
        let err = RequestEnvelope::from_request(&req, Params::new()).unwrap_err();
        assert!(matches!(err, BindError::UnsupportedMediaType { .. }));

        let req = request("/items", Some("application/vnd.api+json; charset=utf-8"), b"{}");
        assert!(RequestEnvelope::from_request(&req, Params::new()).is_ok());
    }

    #[test]
    fn test_builder_headers_append() {
        let envelope = RequestEnvelope::builder()
            .header("X-Token", "foo")
            .header("x-token", "bar")
            .header("bad header", "x")
            .build();
        let values: Vec<_> = envelope.headers().get_all("x-token").iter().collect();
        assert_eq!(values.len(), 2);
        assert_eq!(envelope.headers().len(), 2);
    }
}
