//! Per-field validation rules.
//!
//! Constraints run after type coercion succeeded and look only at the
//! coerced value of their own field. Every constraint of a set is evaluated,
//! so a value that is both too short and fails its pattern reports two
//! errors.

use crate::error::{Location, SchemaError, ValidationError, ValidationErrors};
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;

/// A compiled regular expression together with its source.
///
/// Matching is anchored at the start of the string and not at the end:
/// `^(?:source)`, the way pydantic's `regex=` applies `re.match`.
///
/// Compilation failures are kept until the owning schema is built, so that
/// field declarations stay fluent and the failure is reported as a
/// [`SchemaError::InvalidPattern`] at startup.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    compiled: Result<Regex, String>,
}

impl Pattern {
    /// Compiles a pattern.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&source)
            .and_then(|_| Regex::new(&format!("^(?:{source})")))
            .map_err(|e| e.to_string());
        Self { source, compiled }
    }

    /// Returns the pattern source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn is_match(&self, text: &str) -> bool {
        match &self.compiled {
            Ok(regex) => regex.is_match(text),
            Err(_) => false,
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// A single validation rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Minimum length: characters for strings, elements for sequences and mappings.
    MinLength(usize),
    /// Maximum length: characters for strings, elements for sequences and mappings.
    MaxLength(usize),
    /// Strings must match the pattern from their first character.
    Pattern(Pattern),
    /// Numeric exclusive lower bound.
    Gt(f64),
    /// Numeric inclusive lower bound.
    Ge(f64),
    /// Numeric exclusive upper bound.
    Lt(f64),
    /// Numeric inclusive upper bound.
    Le(f64),
    /// Documentation-only marker; never fails.
    Deprecated,
}

impl Constraint {
    /// Checks a coerced value, returning the violation if any.
    ///
    /// A constraint that does not apply to the value's type (a length bound
    /// on a number, say) is satisfied.
    #[must_use]
    pub fn check(&self, value: &Value, location: &Location) -> Option<ValidationError> {
        match self {
            Self::MinLength(min) => {
                let (len, unit) = measure(value)?;
                (len < *min).then(|| {
                    ValidationError::constraint(
                        location.clone(),
                        "value_error.min_length",
                        format!("ensure this value has at least {min} {unit}"),
                    )
                })
            }
            Self::MaxLength(max) => {
                let (len, unit) = measure(value)?;
                (len > *max).then(|| {
                    ValidationError::constraint(
                        location.clone(),
                        "value_error.max_length",
                        format!("ensure this value has at most {max} {unit}"),
                    )
                })
            }
            Self::Pattern(pattern) => {
                let text = value.as_str()?;
                (!pattern.is_match(text)).then(|| {
                    ValidationError::constraint(
                        location.clone(),
                        "value_error.str.regex",
                        format!("string does not match regex \"{}\"", pattern.as_str()),
                    )
                })
            }
            Self::Gt(bound) => numeric(value, *bound, location, Ordering::is_gt, || {
                ("value_error.number.not_gt", format!("ensure this value is greater than {bound}"))
            }),
            Self::Ge(bound) => numeric(value, *bound, location, Ordering::is_ge, || {
                (
                    "value_error.number.not_ge",
                    format!("ensure this value is greater than or equal to {bound}"),
                )
            }),
            Self::Lt(bound) => numeric(value, *bound, location, Ordering::is_lt, || {
                ("value_error.number.not_lt", format!("ensure this value is less than {bound}"))
            }),
            Self::Le(bound) => numeric(value, *bound, location, Ordering::is_le, || {
                (
                    "value_error.number.not_le",
                    format!("ensure this value is less than or equal to {bound}"),
                )
            }),
            Self::Deprecated => None,
        }
    }
}

fn measure(value: &Value) -> Option<(usize, &'static str)> {
    match value {
        Value::String(s) => Some((s.chars().count(), "characters")),
        Value::Array(items) => Some((items.len(), "items")),
        Value::Object(map) => Some((map.len(), "items")),
        _ => None,
    }
}

fn numeric(
    value: &Value,
    bound: f64,
    location: &Location,
    holds: impl Fn(Ordering) -> bool,
    describe: impl Fn() -> (&'static str, String),
) -> Option<ValidationError> {
    let n = value.as_f64()?;
    if compare(value, n, bound).is_some_and(holds) {
        return None;
    }
    let (code, message) = describe();
    Some(ValidationError::constraint(location.clone(), code, message).with_input(value))
}

// Integers are compared exactly against whole bounds; `as_f64` rounds
// above 2^53. A NaN bound orders nothing, so it always fails.
#[allow(clippy::cast_possible_truncation)]
fn compare(value: &Value, as_float: f64, bound: f64) -> Option<Ordering> {
    let integer = value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from));
    match integer {
        Some(n) if bound.fract() == 0.0 && bound.abs() < 1e38 => Some(n.cmp(&(bound as i128))),
        _ => as_float.partial_cmp(&bound),
    }
}

/// The ordered constraints of one field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet(Vec<Constraint>);

impl ConstraintSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constraint.
    pub fn push(&mut self, constraint: Constraint) {
        self.0.push(constraint);
    }

    /// Returns the constraints in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.0.iter()
    }

    /// Returns true if the set holds no constraint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the field is marked deprecated.
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.0.iter().any(|c| matches!(c, Constraint::Deprecated))
    }

    /// Runs every constraint and appends all violations.
    pub fn validate(&self, value: &Value, location: &Location, errors: &mut ValidationErrors) {
        errors.extend(self.0.iter().filter_map(|c| c.check(value, location)));
    }

    /// Reports the first pattern that failed to compile.
    pub(crate) fn compile_check(&self, field: &str) -> Result<(), SchemaError> {
        for constraint in &self.0 {
            if let Constraint::Pattern(pattern) = constraint {
                if let Err(reason) = &pattern.compiled {
                    return Err(SchemaError::InvalidPattern {
                        field: field.to_string(),
                        pattern: pattern.source.clone(),
                        reason: reason.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<Constraint> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;
    use serde_json::json;

    fn loc() -> Location {
        Location::root("query").child("q")
    }

    #[test]
    fn test_length_bounds_on_strings() {
        let set: ConstraintSet = [Constraint::MinLength(3), Constraint::MaxLength(5)]
            .into_iter()
            .collect();

        let mut errors = ValidationErrors::new();
        set.validate(&json!("ab"), &loc(), &mut errors);
        set.validate(&json!("abc"), &loc(), &mut errors);
        set.validate(&json!("abcdef"), &loc(), &mut errors);

        let codes: Vec<_> = errors.iter().map(ValidationError::code).collect();
        assert_eq!(codes, vec!["value_error.min_length", "value_error.max_length"]);
        assert!(errors.iter().all(|e| e.kind() == ErrorKind::ConstraintViolation));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let c = Constraint::MaxLength(3);
        assert!(c.check(&json!("ééé"), &loc()).is_none());
    }

    #[test]
    fn test_length_on_sequences() {
        let c = Constraint::MinLength(2);
        let err = c.check(&json!(["a"]), &loc()).unwrap();
        assert_eq!(err.message(), "ensure this value has at least 2 items");
        assert!(c.check(&json!(["a", "b"]), &loc()).is_none());
    }

    #[test]
    fn test_all_violations_collected() {
        let set: ConstraintSet = [
            Constraint::MinLength(3),
            Constraint::Pattern(Pattern::new("^fixedquery$")),
        ]
        .into_iter()
        .collect();

        let mut errors = ValidationErrors::new();
        set.validate(&json!("ab"), &loc(), &mut errors);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.as_slice()[1].message(),
            "string does not match regex \"^fixedquery$\""
        );
    }

    #[test]
    fn test_pattern_match() {
        let c = Constraint::Pattern(Pattern::new("^fixedquery$"));
        assert!(c.check(&json!("fixedquery"), &loc()).is_none());
        assert!(c.check(&json!("fixedquery2"), &loc()).is_some());
    }

    #[test]
    fn test_pattern_anchored_at_start_only() {
        let c = Constraint::Pattern(Pattern::new("fixed"));
        assert!(c.check(&json!("fixedquery"), &loc()).is_none());
        assert!(c.check(&json!("a fixedquery"), &loc()).is_some());

        let alternation = Constraint::Pattern(Pattern::new("foo|bar"));
        assert!(alternation.check(&json!("barbaz"), &loc()).is_none());
        assert!(alternation.check(&json!("bazbar"), &loc()).is_some());
        assert_eq!(Pattern::new("foo|bar").as_str(), "foo|bar");
    }

    #[test]
    fn test_bounds_exact_for_large_integers() {
        let limit = 9_007_199_254_740_992_f64;
        let above = json!(9_007_199_254_740_993_i64);
        assert!(Constraint::Le(limit).check(&above, &loc()).is_some());
        assert!(Constraint::Gt(limit).check(&above, &loc()).is_none());
        assert!(Constraint::Le(limit).check(&json!(9_007_199_254_740_992_i64), &loc()).is_none());
        assert!(Constraint::Ge(0.0).check(&json!(u64::MAX), &loc()).is_none());
        assert!(Constraint::Lt(0.5).check(&json!(0), &loc()).is_none());
    }

    #[test]
    fn test_exclusive_and_inclusive_bounds() {
        assert!(Constraint::Gt(0.0).check(&json!(0), &loc()).is_some());
        assert!(Constraint::Gt(0.0).check(&json!(0.0001), &loc()).is_none());
        assert!(Constraint::Ge(0.0).check(&json!(0), &loc()).is_none());
        assert!(Constraint::Le(1000.0).check(&json!(1000), &loc()).is_none());
        assert!(Constraint::Le(1000.0).check(&json!(1001), &loc()).is_some());
        assert!(Constraint::Lt(10.5).check(&json!(10.5), &loc()).is_some());
        assert!(Constraint::Lt(10.5).check(&json!(10.4), &loc()).is_none());
    }

    #[test]
    fn test_bound_messages() {
        let err = Constraint::Gt(0.0).check(&json!(0), &loc()).unwrap();
        assert_eq!(err.code(), "value_error.number.not_gt");
        assert_eq!(err.message(), "ensure this value is greater than 0");
        assert_eq!(err.input(), Some(&json!(0)));
    }

    #[test]
    fn test_inapplicable_constraints_pass() {
        assert!(Constraint::MinLength(3).check(&json!(1), &loc()).is_none());
        assert!(Constraint::Gt(5.0).check(&json!("abc"), &loc()).is_none());
        assert!(Constraint::Deprecated.check(&json!(null), &loc()).is_none());
    }

    #[test]
    fn test_invalid_pattern_reported() {
        let set: ConstraintSet = [Constraint::Pattern(Pattern::new("(unclosed"))]
            .into_iter()
            .collect();
        let err = set.compile_check("q").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));

        let unbalanced: ConstraintSet = [Constraint::Pattern(Pattern::new("a)|(b"))]
            .into_iter()
            .collect();
        assert!(unbalanced.compile_check("q").is_err());
    }

    #[test]
    fn test_deprecated_marker() {
        let set: ConstraintSet = [Constraint::Deprecated].into_iter().collect();
        assert!(set.is_deprecated());
        assert!(!ConstraintSet::new().is_deprecated());
    }

    proptest! {
        #[test]
        fn prop_inclusive_bound_accepts_bound(bound in -1.0e6f64..1.0e6) {
            prop_assert!(Constraint::Ge(bound).check(&json!(bound), &loc()).is_none());
            prop_assert!(Constraint::Le(bound).check(&json!(bound), &loc()).is_none());
        }

        #[test]
        fn prop_exclusive_bound_rejects_bound(bound in -1.0e6f64..1.0e6) {
            prop_assert!(Constraint::Gt(bound).check(&json!(bound), &loc()).is_some());
            prop_assert!(Constraint::Lt(bound).check(&json!(bound), &loc()).is_some());
        }
    }
}
