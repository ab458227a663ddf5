//! Form schema definitions and validation outcome types.
//!
//! A [`FormSchema`] is an ordered rule table keyed by field name. Each
//! [`FieldRule`] declares the target [`FieldType`], how the raw string is
//! turned into that type ([`Coercion`]), and the [`Constraint`]s the coerced
//! value must satisfy. Validation itself lives in
//! [`validator`](crate::validator).

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::Value;

/// Target type a raw form string is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 text.
    Text,
    /// Finite floating-point number.
    Number,
    /// Signed 64-bit integer.
    Integer,
    /// `true`/`false` flag.
    Boolean,
}

impl FieldType {
    /// Lowercase name used in messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a raw form string is converted into the field's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coercion {
    /// No conversion. Only text fields accept a raw string as-is; any
    /// other declared type is a type mismatch.
    None,
    /// Strip surrounding whitespace. Non-text types are parsed after trimming.
    Trim,
    /// Parse the string into the declared type (surrounding whitespace ignored).
    #[default]
    Parse,
}

/// Predicate kinds a coerced value can be checked against.
#[derive(Debug, Clone)]
pub enum Check {
    /// Numeric value strictly greater than the bound.
    GreaterThan(f64),
    /// Numeric value greater than or equal to the bound.
    AtLeast(f64),
    /// Numeric value strictly less than the bound.
    LessThan(f64),
    /// Numeric value less than or equal to the bound.
    AtMost(f64),
    /// Text with at least this many characters.
    MinLength(usize),
    /// Text with at most this many characters.
    MaxLength(usize),
    /// Value (as submitted text) is one of an enumerated set.
    OneOf(Vec<String>),
    /// Text matches a regular expression.
    Pattern(Regex),
}

impl Check {
    /// Evaluates the predicate against a coerced value.
    ///
    /// Numeric checks fail on non-numeric values; text checks use the
    /// value's form rendering.
    #[must_use]
    pub fn holds(&self, value: &Value) -> bool {
        match self {
            Self::GreaterThan(bound) => value.as_number().is_some_and(|n| n > *bound),
            Self::AtLeast(bound) => value.as_number().is_some_and(|n| n >= *bound),
            Self::LessThan(bound) => value.as_number().is_some_and(|n| n < *bound),
            Self::AtMost(bound) => value.as_number().is_some_and(|n| n <= *bound),
            Self::MinLength(min) => value.to_form_string().chars().count() >= *min,
            Self::MaxLength(max) => value.to_form_string().chars().count() <= *max,
            Self::OneOf(options) => {
                let text = value.to_form_string();
                options.iter().any(|o| *o == text)
            }
            Self::Pattern(re) => re.is_match(&value.to_form_string()),
        }
    }

    fn default_message(&self) -> String {
        match self {
            Self::GreaterThan(bound) => format!("must be > {bound}"),
            Self::AtLeast(bound) => format!("must be >= {bound}"),
            Self::LessThan(bound) => format!("must be < {bound}"),
            Self::AtMost(bound) => format!("must be <= {bound}"),
            Self::MinLength(min) => format!("must contain at least {min} character(s)"),
            Self::MaxLength(max) => format!("must contain at most {max} character(s)"),
            Self::OneOf(options) => format!("must be one of: {}", options.join(", ")),
            Self::Pattern(re) => format!("must match pattern {}", re.as_str()),
        }
    }
}

/// A predicate plus the customer-facing message reported when it fails.
#[derive(Debug, Clone)]
pub struct Constraint {
    /// The predicate to evaluate.
    pub check: Check,
    /// Message reported on violation.
    pub message: String,
}

impl Constraint {
    /// Wraps a check with its default message.
    #[must_use]
    pub fn new(check: Check) -> Self {
        let message = check.default_message();
        Self { check, message }
    }

    /// Replaces the violation message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn greater_than(bound: f64) -> Self {
        Self::new(Check::GreaterThan(bound))
    }

    #[must_use]
    pub fn at_least(bound: f64) -> Self {
        Self::new(Check::AtLeast(bound))
    }

    #[must_use]
    pub fn less_than(bound: f64) -> Self {
        Self::new(Check::LessThan(bound))
    }

    #[must_use]
    pub fn at_most(bound: f64) -> Self {
        Self::new(Check::AtMost(bound))
    }

    #[must_use]
    pub fn min_length(min: usize) -> Self {
        Self::new(Check::MinLength(min))
    }

    #[must_use]
    pub fn max_length(max: usize) -> Self {
        Self::new(Check::MaxLength(max))
    }

    /// Enumerated-set membership.
    #[must_use]
    pub fn one_of<S: AsRef<str>>(options: &[S]) -> Self {
        Self::new(Check::OneOf(
            options.iter().map(|o| o.as_ref().to_string()).collect(),
        ))
    }

    #[must_use]
    pub fn pattern(re: Regex) -> Self {
        Self::new(Check::Pattern(re))
    }
}

/// Declared rule for a single form field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Submitted field name (the form input's `name`).
    pub name: String,
    /// Type the raw string is coerced into.
    pub field_type: FieldType,
    /// Conversion applied to the raw string.
    pub coercion: Coercion,
    /// Constraints checked in declaration order after coercion.
    pub constraints: Vec<Constraint>,
    /// Whether the field must be present in the submission.
    pub required: bool,
    /// Customer-facing message replacing the generated type-mismatch text.
    pub type_message: Option<String>,
}

impl FieldRule {
    /// Creates a required rule with the type's default coercion.
    ///
    /// Text defaults to [`Coercion::None`]; other types to [`Coercion::Parse`].
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let coercion = match field_type {
            FieldType::Text => Coercion::None,
            _ => Coercion::Parse,
        };
        Self {
            name: name.into(),
            field_type,
            coercion,
            constraints: Vec::new(),
            required: true,
            type_message: None,
        }
    }

    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    #[must_use]
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    /// Overrides the coercion.
    #[must_use]
    pub fn coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = coercion;
        self
    }

    /// Shorthand for [`Coercion::Trim`].
    #[must_use]
    pub fn trimmed(self) -> Self {
        self.coercion(Coercion::Trim)
    }

    /// Marks the field optional: absence is not an error.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Appends a constraint.
    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Sets the message reported for missing or uncoercible input.
    #[must_use]
    pub fn type_message(mut self, message: impl Into<String>) -> Self {
        self.type_message = Some(message.into());
        self
    }
}

/// Ordered rule table. Field order is declaration order.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    rules: Vec<FieldRule>,
}

impl FormSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule, replacing any earlier rule for the same field in place.
    #[must_use]
    pub fn field(mut self, rule: FieldRule) -> Self {
        if let Some(existing) = self.rules.iter_mut().find(|r| r.name == rule.name) {
            *existing = rule;
        } else {
            self.rules.push(rule);
        }
        self
    }

    /// Rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Looks up the rule for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Names of all required fields, in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|r| r.required)
            .map(|r| r.name.as_str())
    }

    /// New schema without the named fields.
    #[must_use]
    pub fn omit(&self, names: &[&str]) -> Self {
        Self {
            rules: self
                .rules
                .iter()
                .filter(|r| !names.contains(&r.name.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// New schema with only the named fields, in this schema's order.
    #[must_use]
    pub fn pick(&self, names: &[&str]) -> Self {
        Self {
            rules: self
                .rules
                .iter()
                .filter(|r| names.contains(&r.name.as_str()))
                .cloned()
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Raw form submission: field name to raw string. Absent keys are missing fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Submission {
    fields: HashMap<String, String>,
}

impl Submission {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning `self` for chaining.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, raw: impl Into<String>) -> Self {
        self.insert(name, raw);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, raw: impl Into<String>) {
        self.fields.insert(name.into(), raw.into());
    }

    /// Raw value for `name`, or `None` when the field was not submitted.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Re-serializes a validated record into a submission.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        record
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_form_string()))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<HashMap<String, String>> for Submission {
    fn from(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Submission {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Coerced, validated values keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Typed reason a single field failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldIssue {
    /// The raw value was missing or could not be coerced to the declared type.
    #[error("{message}")]
    TypeMismatch {
        /// Declared type the input should have converted to.
        expected: FieldType,
        /// Customer-facing message.
        message: String,
    },
    /// The coerced value failed a declared constraint.
    #[error("{message}")]
    ConstraintViolation {
        /// The constraint's declared message.
        message: String,
    },
}

impl FieldIssue {
    /// The customer-facing message carried by either kind.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::TypeMismatch { message, .. } | Self::ConstraintViolation { message } => message,
        }
    }
}

/// Per-field issue lists, keyed by field name.
pub type IssueReport = BTreeMap<String, Vec<FieldIssue>>;

/// Per-field error messages, in constraint declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Messages for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Appends a message to `field`'s list.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Failed field names.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl From<&IssueReport> for FieldErrors {
    fn from(report: &IssueReport) -> Self {
        Self {
            errors: report
                .iter()
                .map(|(field, issues)| {
                    (
                        field.clone(),
                        issues.iter().map(|i| i.message().to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

/// Result of validating a submission against a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Every declared field coerced and satisfied its constraints.
    Valid {
        /// The coerced values.
        record: Record,
    },
    /// One or more fields failed.
    Invalid {
        /// Messages per failed field.
        errors: FieldErrors,
    },
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// The record, when valid.
    #[must_use]
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::Valid { record } => Some(record),
            Self::Invalid { .. } => None,
        }
    }

    /// The field errors, when invalid.
    #[must_use]
    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid { errors } => Some(errors),
        }
    }

    /// Converts into a `Result` for `?`-style handling by callers.
    ///
    /// # Errors
    ///
    /// Returns the field errors when the submission was invalid.
    pub fn into_result(self) -> Result<Record, FieldErrors> {
        match self {
            Self::Valid { record } => Ok(record),
            Self::Invalid { errors } => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> FormSchema {
        FormSchema::new()
            .field(FieldRule::text("id"))
            .field(FieldRule::text("customerId"))
            .field(FieldRule::number("amount"))
            .field(FieldRule::text("date").optional())
    }

    #[test]
    fn default_messages_render_bounds() {
        assert_eq!(Constraint::greater_than(0.0).message, "must be > 0");
        assert_eq!(Constraint::at_most(99.5).message, "must be <= 99.5");
        assert_eq!(
            Constraint::one_of(&["pending", "paid"]).message,
            "must be one of: pending, paid"
        );
    }

    #[test]
    fn with_message_overrides_default() {
        let c = Constraint::greater_than(0.0).with_message("too small");
        assert_eq!(c.message, "too small");
    }

    #[test]
    fn numeric_check_rejects_text_value() {
        assert!(!Check::GreaterThan(0.0).holds(&Value::from("5")));
        assert!(Check::GreaterThan(0.0).holds(&Value::Integer(5)));
    }

    #[test]
    fn length_checks_count_chars_not_bytes() {
        let v = Value::from("héllo");
        assert!(Check::MaxLength(5).holds(&v));
        assert!(Check::MinLength(5).holds(&v));
        assert!(!Check::MinLength(6).holds(&v));
    }

    #[test]
    fn pattern_check_matches() {
        let re = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
        assert!(Check::Pattern(re.clone()).holds(&Value::from("2024-01-31")));
        assert!(!Check::Pattern(re).holds(&Value::from("31/01/2024")));
    }

    #[test]
    fn text_rule_defaults_to_no_coercion() {
        assert_eq!(FieldRule::text("x").coercion, Coercion::None);
        assert_eq!(FieldRule::number("x").coercion, Coercion::Parse);
        assert!(FieldRule::number("x").required);
    }

    #[test]
    fn field_replaces_existing_rule_in_place() {
        let schema = sample_schema().field(FieldRule::number("customerId"));
        let names: Vec<_> = schema.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["id", "customerId", "amount", "date"]);
        assert_eq!(
            schema.get("customerId").unwrap().field_type,
            FieldType::Number
        );
    }

    #[test]
    fn omit_drops_named_fields_and_keeps_order() {
        let schema = sample_schema().omit(&["id", "date"]);
        let names: Vec<_> = schema.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["customerId", "amount"]);
    }

    #[test]
    fn pick_keeps_schema_order() {
        let schema = sample_schema().pick(&["amount", "id"]);
        let names: Vec<_> = schema.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["id", "amount"]);
    }

    #[test]
    fn required_fields_skip_optional() {
        let schema = sample_schema();
        let required: Vec<_> = schema.required_fields().collect();
        assert_eq!(required, ["id", "customerId", "amount"]);
    }

    #[test]
    fn submission_from_record_renders_form_strings() {
        let mut record = Record::default();
        record.insert("amount", Value::Number(42.5));
        record.insert("status", Value::from("paid"));
        let sub = Submission::from_record(&record);
        assert_eq!(sub.get("amount"), Some("42.5"));
        assert_eq!(sub.get("status"), Some("paid"));
        assert_eq!(sub.len(), 2);
    }

    #[test]
    fn field_errors_serialize_as_object_of_lists() {
        let mut errors = FieldErrors::default();
        errors.push("amount", "must be > 0");
        errors.push("amount", "must be <= 100");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"amount": ["must be > 0", "must be <= 100"]})
        );
    }

    #[test]
    fn into_result_splits_variants() {
        let valid = ValidationResult::Valid {
            record: Record::default(),
        };
        assert!(valid.is_valid());
        assert!(valid.into_result().is_ok());

        let mut errors = FieldErrors::default();
        errors.push("x", "bad");
        let invalid = ValidationResult::Invalid { errors };
        assert!(invalid.errors().unwrap().contains("x"));
        assert!(invalid.into_result().is_err());
    }
}
