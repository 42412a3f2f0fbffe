//! Reading raw parameter values out of a [`RequestEnvelope`].
//!
//! | Source | Lookup key | Sequence-typed field |
//! |--------|------------|----------------------|
//! | path | alias or name | not applicable |
//! | query | alias or name | every value of a repeated key |
//! | header | alias, or name with `_` turned into `-` | every value of a repeated header |
//! | body | whole body, or `body[key]` when embedded | the JSON value as is |
//!
//! A scalar field given a repeated query key or header takes the last
//! value. Path values are percent-decoded. Nothing here converts types:
//! query, path and header values come out as JSON strings, or arrays of
//! strings, for the coercer.

use crate::envelope::RequestEnvelope;
use crate::error::{BindError, ParamSource};
use crate::operation::Param;
use hypatia_schema::{FieldType, Location, ValidationError, ValidationErrors};
use http::HeaderName;
use serde_json::Value;

/// The location errors for `param` are reported under.
///
/// `path.item_id`, `query.q`, `header.user-agent`, `body` for a parameter
/// read from the whole body and `body.item` for an embedded one.
#[must_use]
pub fn location(param: &Param) -> Location {
    let root = Location::root(param.source().as_str());
    if param.source() == ParamSource::Body && !param.is_embedded() {
        return root;
    }
    root.child(param.wire_name().into_owned())
}

/// Extracts the raw value of `param`, or `None` if the request does not
/// carry it.
///
/// # Errors
///
/// Returns [`BindError::UnmatchedPathParam`] when a path parameter was not
/// captured: the route was matched against a template that does not
/// belong to this operation. A captured path value that does not decode
/// to UTF-8 is a [`BindError::Validation`] at the parameter's location.
pub fn extract(param: &Param, envelope: &RequestEnvelope) -> Result<Option<Value>, BindError> {
    let key = param.wire_name();
    let sequence = is_sequence(param.field().ty());

    let raw = match param.source() {
        ParamSource::Path => match envelope.path_params().decoded(&key) {
            Some(Ok(value)) => Some(Value::String(value.into_owned())),
            Some(Err(_)) => {
                let error = ValidationError::structure(
                    location(param),
                    "value_error.path.encoding",
                    "path segment is not valid percent-encoded UTF-8",
                );
                let raw = envelope.path_params().get(&key).unwrap_or_default();
                let mut errors = ValidationErrors::new();
                errors.push(error.with_input(&Value::String(raw.to_string())));
                return Err(BindError::Validation(errors));
            }
            None => {
                return Err(BindError::UnmatchedPathParam {
                    operation: String::new(),
                    name: key.into_owned(),
                })
            }
        },
        ParamSource::Query => collect(envelope.query().get_all(&key), sequence),
        ParamSource::Header => {
            let values = HeaderName::from_bytes(key.as_bytes())
                .ok()
                .map(|name| {
                    envelope
                        .headers()
                        .get_all(name)
                        .iter()
                        .filter_map(|v| v.to_str().ok())
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            collect(values.iter().map(String::as_str), sequence)
        }
        ParamSource::Body => match envelope.body() {
            None => None,
            Some(body) if param.is_embedded() => body.as_object().and_then(|o| o.get(&*key)).cloned(),
            Some(body) => Some(body.clone()),
        },
    };
    Ok(raw)
}

fn collect<'a>(values: impl Iterator<Item = &'a str>, sequence: bool) -> Option<Value> {
    if sequence {
        let all: Vec<Value> = values.map(|v| Value::String(v.to_string())).collect();
        return (!all.is_empty()).then_some(Value::Array(all));
    }
    values.last().map(|v| Value::String(v.to_string()))
}

// Sequences can hide behind a union, as in `Union[List[str], None]`.
fn is_sequence(ty: &FieldType) -> bool {
    match ty {
        FieldType::Union(alternatives) => alternatives.iter().any(is_sequence),
        other => other.is_sequence(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypatia_schema::FieldSpec;
    use serde_json::json;

    fn envelope() -> RequestEnvelope {
        RequestEnvelope::builder()
            .path_param("item_id", "5")
            .query_string("q=foo&q=bar&item-query=aliased&limit=3")
            .header("user-agent", "curl/8.0")
            .header("strange_header", "odd")
            .header("x-token", "foo")
            .header("x-token", "bar")
            .body(json!({"item": {"name": "Foo"}, "importance": 5}))
            .build()
    }

    #[test]
    fn test_path_value_is_string() {
        let param = Param::path(FieldSpec::new("item_id", FieldType::Int));
        assert_eq!(extract(&param, &envelope()).unwrap(), Some(json!("5")));
        assert_eq!(location(&param).to_string(), "path.item_id");
    }

    #[test]
    fn test_path_value_is_decoded() {
        let param = Param::path(FieldSpec::new("user_id", FieldType::Str));
        let encoded = RequestEnvelope::builder().path_param("user_id", "john%20doe").build();
        assert_eq!(extract(&param, &encoded).unwrap(), Some(json!("john doe")));

        let invalid = RequestEnvelope::builder().path_param("user_id", "%FF").build();
        let err = extract(&param, &invalid).unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.as_slice()[0].code(), "value_error.path.encoding");
        assert_eq!(errors.as_slice()[0].location().to_string(), "path.user_id");
    }

    #[test]
    fn test_unmatched_path_param() {
        let param = Param::path(FieldSpec::new("user_id", FieldType::Int));
        let err = extract(&param, &envelope()).unwrap_err();
        assert!(matches!(err, BindError::UnmatchedPathParam { ref name, .. } if name == "user_id"));
    }

    #[test]
    fn test_query_scalar_takes_last() {
        let param = Param::query(FieldSpec::new("q", FieldType::Str));
        assert_eq!(extract(&param, &envelope()).unwrap(), Some(json!("bar")));
    }

    #[test]
    fn test_query_sequence_takes_all() {
        let param = Param::query(FieldSpec::new("q", FieldType::list(FieldType::Str)).optional());
        assert_eq!(extract(&param, &envelope()).unwrap(), Some(json!(["foo", "bar"])));

        let nullable = Param::query(
            FieldSpec::new("q", FieldType::union([FieldType::list(FieldType::Str)])).optional(),
        );
        assert_eq!(extract(&nullable, &envelope()).unwrap(), Some(json!(["foo", "bar"])));

        let absent = Param::query(FieldSpec::new("tags", FieldType::list(FieldType::Str)).optional());
        assert_eq!(extract(&absent, &envelope()).unwrap(), None);
    }

    #[test]
    fn test_query_alias() {
        let param = Param::query(FieldSpec::new("q", FieldType::Str).alias("item-query"));
        assert_eq!(extract(&param, &envelope()).unwrap(), Some(json!("aliased")));
        assert_eq!(location(&param).to_string(), "query.item-query");
    }

    #[test]
    fn test_header_underscore_conversion() {
        let param = Param::header(FieldSpec::new("user_agent", FieldType::Str));
        assert_eq!(extract(&param, &envelope()).unwrap(), Some(json!("curl/8.0")));
        assert_eq!(location(&param).to_string(), "header.user-agent");

        let converted = Param::header(FieldSpec::new("strange_header", FieldType::Str).optional());
        assert_eq!(extract(&converted, &envelope()).unwrap(), None);

        let literal = Param::header(
            FieldSpec::new("strange_header", FieldType::Str)
                .optional()
                .convert_underscores(false),
        );
        assert_eq!(extract(&literal, &envelope()).unwrap(), Some(json!("odd")));
    }

    #[test]
    fn test_header_sequence() {
        let param = Param::header(FieldSpec::new("x_token", FieldType::list(FieldType::Str)).optional());
        assert_eq!(extract(&param, &envelope()).unwrap(), Some(json!(["foo", "bar"])));

        let scalar = Param::header(FieldSpec::new("x_token", FieldType::Str));
        assert_eq!(extract(&scalar, &envelope()).unwrap(), Some(json!("bar")));
    }

    #[test]
    fn test_body_whole_and_embedded() {
        let whole = Param::body(FieldSpec::new("payload", FieldType::Any));
        assert_eq!(
            extract(&whole, &envelope()).unwrap(),
            Some(json!({"item": {"name": "Foo"}, "importance": 5}))
        );
        assert_eq!(location(&whole).to_string(), "body");

        let embedded = Param::body(FieldSpec::new("item", FieldType::Any)).embed();
        assert_eq!(extract(&embedded, &envelope()).unwrap(), Some(json!({"name": "Foo"})));
        assert_eq!(location(&embedded).to_string(), "body.item");

        let missing = Param::body(FieldSpec::new("user", FieldType::Any)).embed();
        assert_eq!(extract(&missing, &envelope()).unwrap(), None);
    }

    #[test]
    fn test_absent_body() {
        let param = Param::body(FieldSpec::new("item", FieldType::Any));
        assert_eq!(extract(&param, &RequestEnvelope::default()).unwrap(), None);
    }
}
