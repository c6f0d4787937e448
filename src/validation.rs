//! Field-keyed validation errors
//!
//! Every pre-write check runs to completion and reports all failing fields
//! together. Validation never has side effects; callers only persist once
//! `into_result` returns `Ok`.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Malaysian NRIC: 12 digits, optionally dash-separated (YYMMDD-PB-XXXX)
pub static NRIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{6}-?\d{2}-?\d{4}$").expect("valid NRIC regex"));

/// Loose phone check: digits, spaces, dashes and a leading +
pub static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s-]{7,20}$").expect("valid phone regex"));

/// Accumulator for per-field validation messages
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq, utoipa::ToSchema)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// Record a failure only when `failed` holds
    pub fn add_if(&mut self, failed: bool, field: &str, message: &str) {
        if failed {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fold another accumulator into this one
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Turn the accumulator into an operation result
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        flatten(&mut out, "", &errors);
        out
    }
}

// Nested errors keep their path ("items[0].quantity") as the field key
fn flatten(out: &mut FieldErrors, prefix: &str, errors: &validator::ValidationErrors) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value for {}", path));
                    out.add(&path, message);
                }
            }
            ValidationErrorsKind::Struct(nested) => flatten(out, &path, nested),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flatten(out, &format!("{}[{}]", path, index), nested);
                }
            }
        }
    }
}

/// Run derive-based validation and convert failures into the field map
pub fn check<T: validator::Validate>(input: &T) -> FieldErrors {
    match input.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
        name: String,
    }

    #[test]
    fn reports_all_failing_fields_together() {
        let sample = Sample {
            email: "not-an-email".to_string(),
            name: "ab".to_string(),
        };

        let errors = check(&sample);
        assert!(errors.contains("email"));
        assert!(errors.contains("name"));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn empty_accumulator_is_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn merge_keeps_both_sides() {
        let mut a = FieldErrors::new();
        a.add("purpose", "required");
        let mut b = FieldErrors::new();
        b.add("purpose", "too long");
        b.add("location", "required");

        a.merge(b);
        assert_eq!(a.messages("purpose").len(), 2);
        assert!(a.contains("location"));
    }

    #[test]
    fn nested_list_errors_keep_their_path() {
        #[derive(Validate)]
        struct Line {
            #[validate(range(min = 1, message = "Quantity must be at least 1"))]
            quantity: i32,
        }

        #[derive(Validate)]
        struct Order {
            #[validate(nested)]
            items: Vec<Line>,
        }

        let order = Order {
            items: vec![Line { quantity: 1 }, Line { quantity: 0 }],
        };

        let errors = check(&order);
        assert!(errors.contains("items[1].quantity"));
        assert!(!errors.contains("items[0].quantity"));
    }

    #[test]
    fn nric_pattern_accepts_both_spellings() {
        assert!(NRIC_RE.is_match("880101-14-5523"));
        assert!(NRIC_RE.is_match("880101145523"));
        assert!(!NRIC_RE.is_match("88-01-01"));
    }
}
