//! Scalar parsing rules.
//!
//! All parsing is locale independent. Raw values may arrive as JSON values
//! from a decoded body or as strings from the path, query or headers, so
//! every parser accepts both.

use crate::field::EnumType;
use serde_json::{Number, Value};

/// Literal forms accepted for `true`, compared case-insensitively.
pub const TRUE_LITERALS: [&str; 4] = ["true", "1", "yes", "on"];

/// Literal forms accepted for `false`, compared case-insensitively.
pub const FALSE_LITERALS: [&str; 4] = ["false", "0", "no", "off"];

/// A scalar parse failure: error tag and message.
pub(crate) type Failure = (&'static str, String);

pub(crate) fn parse_str(raw: &Value) -> Result<Value, Failure> {
    match raw {
        Value::String(_) => Ok(raw.clone()),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        _ => Err(("type_error.str", "str type expected".to_string())),
    }
}

pub(crate) fn parse_int(raw: &Value) -> Result<Value, Failure> {
    let invalid = || ("type_error.integer", "value is not a valid integer".to_string());
    match raw {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(raw.clone()),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| Value::from(f as i64))
            .ok_or_else(invalid),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

pub(crate) fn parse_float(raw: &Value) -> Result<Value, Failure> {
    let invalid = || ("type_error.float", "value is not a valid float".to_string());
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(invalid)
}

pub(crate) fn parse_bool(raw: &Value) -> Result<Value, Failure> {
    let invalid = || {
        (
            "type_error.bool",
            "value could not be parsed to a boolean".to_string(),
        )
    };
    match raw {
        Value::Bool(_) => Ok(raw.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Ok(Value::Bool(true)),
            Some(0) => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        Value::String(s) => {
            let lowered = s.trim().to_ascii_lowercase();
            if TRUE_LITERALS.contains(&lowered.as_str()) {
                Ok(Value::Bool(true))
            } else if FALSE_LITERALS.contains(&lowered.as_str()) {
                Ok(Value::Bool(false))
            } else {
                Err(invalid())
            }
        }
        _ => Err(invalid()),
    }
}

pub(crate) fn parse_enum(raw: &Value, ty: &EnumType) -> Result<Value, Failure> {
    let candidate = match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    match candidate {
        Some(member) if ty.contains(&member) => Ok(Value::String(member)),
        _ => {
            let permitted = ty
                .members()
                .iter()
                .map(|m| format!("'{m}'"))
                .collect::<Vec<_>>()
                .join(", ");
            Err((
                "type_error.enum",
                format!("value is not a valid enumeration member; permitted: {permitted}"),
            ))
        }
    }
}

pub(crate) fn parse_email(raw: &Value) -> Result<Value, Failure> {
    let invalid = || ("value_error.email", "value is not a valid email address".to_string());
    let s = raw.as_str().ok_or_else(invalid)?;
    let (local, domain) = s.split_once('@').ok_or_else(invalid)?;
    let well_formed = !local.is_empty()
        && !domain.contains('@')
        && !s.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty());
    if well_formed {
        Ok(raw.clone())
    } else {
        Err(invalid())
    }
}

pub(crate) fn parse_url(raw: &Value) -> Result<Value, Failure> {
    let invalid = || ("value_error.url", "value is not a valid http(s) URL".to_string());
    let s = raw.as_str().ok_or_else(invalid)?;
    let parsed = url::Url::parse(s).map_err(|_| invalid())?;
    if matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some() {
        Ok(raw.clone())
    } else {
        Err(invalid())
    }
}

/// Renders a coerced mapping key back into an object key.
pub(crate) fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_parsing() {
        assert_eq!(parse_int(&json!("42")).unwrap(), json!(42));
        assert_eq!(parse_int(&json!(" -7 ")).unwrap(), json!(-7));
        assert_eq!(parse_int(&json!(3.0)).unwrap(), json!(3));
        assert!(parse_int(&json!(3.5)).is_err());
        assert!(parse_int(&json!("foo")).is_err());
        assert!(parse_int(&json!("4.2")).is_err());
        assert!(parse_int(&json!(true)).is_err());
    }

    #[test]
    fn test_float_parsing() {
        assert_eq!(parse_float(&json!("10.5")).unwrap(), json!(10.5));
        assert_eq!(parse_float(&json!(3)).unwrap(), json!(3.0));
        assert!(parse_float(&json!("1,5")).is_err());
        assert!(parse_float(&json!("NaN")).is_err());
        assert!(parse_float(&json!("inf")).is_err());
    }

    #[test]
    fn test_bool_literals() {
        for literal in ["true", "TRUE", "1", "yes", "On"] {
            assert_eq!(parse_bool(&json!(literal)).unwrap(), json!(true), "{literal}");
        }
        for literal in ["false", "False", "0", "no", "OFF"] {
            assert_eq!(parse_bool(&json!(literal)).unwrap(), json!(false), "{literal}");
        }
        assert!(parse_bool(&json!("maybe")).is_err());
        assert!(parse_bool(&json!(2)).is_err());
        assert_eq!(parse_bool(&json!(0)).unwrap(), json!(false));
    }

    #[test]
    fn test_str_parsing() {
        assert_eq!(parse_str(&json!("x")).unwrap(), json!("x"));
        assert_eq!(parse_str(&json!(5)).unwrap(), json!("5"));
        assert!(parse_str(&json!({"a": 1})).is_err());
        assert!(parse_str(&json!(false)).is_err());
    }

    #[test]
    fn test_enum_reports_allowed_set() {
        let ty = EnumType::new("ModelName", ["alexnet", "resnet", "lenet"]);
        assert_eq!(parse_enum(&json!("resnet"), &ty).unwrap(), json!("resnet"));

        let (code, message) = parse_enum(&json!("vgg"), &ty).unwrap_err();
        assert_eq!(code, "type_error.enum");
        assert_eq!(
            message,
            "value is not a valid enumeration member; permitted: 'alexnet', 'resnet', 'lenet'"
        );
    }

    #[test]
    fn test_email_format() {
        assert!(parse_email(&json!("john@example.com")).is_ok());
        assert!(parse_email(&json!("john@example")).is_err());
        assert!(parse_email(&json!("@example.com")).is_err());
        assert!(parse_email(&json!("a@b@c.com")).is_err());
        assert!(parse_email(&json!("jo hn@example.com")).is_err());
    }

    #[test]
    fn test_url_format() {
        assert!(parse_url(&json!("https://example.com/baz.jpg")).is_ok());
        assert!(parse_url(&json!("ftp://example.com/baz.jpg")).is_err());
        assert!(parse_url(&json!("not a url")).is_err());
    }

    #[test]
    fn test_key_string() {
        assert_eq!(key_string(&json!(1)), "1");
        assert_eq!(key_string(&json!("a")), "a");
        assert_eq!(key_string(&json!(true)), "true");
    }
}
