//! Schema-driven form validation with per-field error aggregation.
//!
//! Every declared field is evaluated independently: coercion first, then
//! constraints in declaration order. Failures are collected across all
//! fields so the caller can display every problem at once. Submitted keys
//! with no matching rule are ignored.
//!
//! Validation is pure: no I/O, no shared state, safe to call concurrently.

use crate::schema::{
    Coercion, FieldErrors, FieldIssue, FieldRule, FieldType, FormSchema, IssueReport, Record,
    Submission, ValidationResult,
};
use crate::types::Value;

/// Message for a required field absent from the submission.
pub const REQUIRED_MESSAGE: &str = "Required";

/// Conversion from a raw form string into a typed value.
///
/// Implemented once per target type so that [`FieldType`] dispatch is a
/// plain match and adding a type means adding one impl.
pub trait Coerce: Sized {
    /// The schema type this impl serves.
    const FIELD_TYPE: FieldType;

    /// Converts `raw` under `coercion`, or `None` if it cannot be represented.
    fn coerce(raw: &str, coercion: Coercion) -> Option<Self>;

    /// Wraps the typed value for storage in a [`Record`].
    fn into_value(self) -> Value;
}

impl Coerce for String {
    const FIELD_TYPE: FieldType = FieldType::Text;

    fn coerce(raw: &str, coercion: Coercion) -> Option<Self> {
        match coercion {
            Coercion::Trim => Some(raw.trim().to_string()),
            Coercion::None | Coercion::Parse => Some(raw.to_string()),
        }
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl Coerce for f64 {
    const FIELD_TYPE: FieldType = FieldType::Number;

    /// Form-number semantics: surrounding whitespace is ignored and a blank
    /// input reads as zero. Non-finite results are rejected.
    fn coerce(raw: &str, coercion: Coercion) -> Option<Self> {
        if coercion == Coercion::None {
            return None;
        }
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Some(0.0);
        }
        trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    fn into_value(self) -> Value {
        Value::Number(self)
    }
}

impl Coerce for i64 {
    const FIELD_TYPE: FieldType = FieldType::Integer;

    fn coerce(raw: &str, coercion: Coercion) -> Option<Self> {
        if coercion == Coercion::None {
            return None;
        }
        raw.trim().parse::<i64>().ok()
    }

    fn into_value(self) -> Value {
        Value::Integer(self)
    }
}

impl Coerce for bool {
    const FIELD_TYPE: FieldType = FieldType::Boolean;

    fn coerce(raw: &str, coercion: Coercion) -> Option<Self> {
        if coercion == Coercion::None {
            return None;
        }
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" | "yes" => Some(true),
            "false" | "off" | "0" | "no" => Some(false),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }
}

fn coerce_as<T: Coerce>(rule: &FieldRule, raw: &str) -> Result<Value, FieldIssue> {
    T::coerce(raw, rule.coercion)
        .map(Coerce::into_value)
        .ok_or_else(|| FieldIssue::TypeMismatch {
            expected: T::FIELD_TYPE,
            message: rule
                .type_message
                .clone()
                .unwrap_or_else(|| format!("Expected {}, received {raw:?}", T::FIELD_TYPE)),
        })
}

/// Coerces a present raw value according to the rule's declared type.
///
/// # Errors
///
/// Returns [`FieldIssue::TypeMismatch`] if the value cannot be converted.
pub fn coerce_field(rule: &FieldRule, raw: &str) -> Result<Value, FieldIssue> {
    match rule.field_type {
        FieldType::Text => coerce_as::<String>(rule, raw),
        FieldType::Number => coerce_as::<f64>(rule, raw),
        FieldType::Integer => coerce_as::<i64>(rule, raw),
        FieldType::Boolean => coerce_as::<bool>(rule, raw),
    }
}

/// Runs every constraint of `rule` against `value`, in declaration order.
#[must_use]
pub fn check_constraints(rule: &FieldRule, value: &Value) -> Vec<FieldIssue> {
    rule.constraints
        .iter()
        .filter(|c| !c.check.holds(value))
        .map(|c| FieldIssue::ConstraintViolation {
            message: c.message.clone(),
        })
        .collect()
}

/// Outcome of evaluating one field.
enum FieldOutcome {
    Value(Value),
    Skipped,
    Failed(Vec<FieldIssue>),
}

fn evaluate_field(rule: &FieldRule, submission: &Submission) -> FieldOutcome {
    let Some(raw) = submission.get(&rule.name) else {
        if !rule.required {
            return FieldOutcome::Skipped;
        }
        return FieldOutcome::Failed(vec![FieldIssue::TypeMismatch {
            expected: rule.field_type,
            message: rule
                .type_message
                .clone()
                .unwrap_or_else(|| REQUIRED_MESSAGE.to_string()),
        }]);
    };

    match coerce_field(rule, raw) {
        Ok(value) => {
            let violations = check_constraints(rule, &value);
            if violations.is_empty() {
                FieldOutcome::Value(value)
            } else {
                FieldOutcome::Failed(violations)
            }
        }
        Err(issue) => FieldOutcome::Failed(vec![issue]),
    }
}

/// Validator bound to a single schema.
#[derive(Debug, Clone, Copy)]
pub struct FormValidator<'a> {
    schema: &'a FormSchema,
}

impl<'a> FormValidator<'a> {
    #[must_use]
    pub fn new(schema: &'a FormSchema) -> Self {
        Self { schema }
    }

    /// Validates and keeps the typed issue for each failure.
    ///
    /// # Errors
    ///
    /// Returns the per-field issue report when any field fails.
    pub fn validate_detailed(&self, submission: &Submission) -> Result<Record, IssueReport> {
        let mut record = Record::default();
        let mut report = IssueReport::new();

        for rule in self.schema.rules() {
            match evaluate_field(rule, submission) {
                FieldOutcome::Value(value) => record.insert(rule.name.clone(), value),
                FieldOutcome::Skipped => {}
                FieldOutcome::Failed(issues) => {
                    report.insert(rule.name.clone(), issues);
                }
            }
        }

        if report.is_empty() {
            Ok(record)
        } else {
            Err(report)
        }
    }

    /// Validates a submission, reporting failures as message lists.
    #[must_use]
    pub fn validate(&self, submission: &Submission) -> ValidationResult {
        match self.validate_detailed(submission) {
            Ok(record) => ValidationResult::Valid { record },
            Err(report) => ValidationResult::Invalid {
                errors: FieldErrors::from(&report),
            },
        }
    }
}

/// Validates `submission` against `schema`.
#[must_use]
pub fn validate(schema: &FormSchema, submission: &Submission) -> ValidationResult {
    FormValidator::new(schema).validate(submission)
}
