use std::fmt;

use serde::{Deserialize, Serialize};

/// Typed value produced by coercing a raw form string.
///
/// Serializes untagged so a validated record renders as a plain JSON
/// object (`{"amount": 42.5, "status": "pending"}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag (checkbox-style inputs).
    Boolean(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// Finite 64-bit IEEE 754 number.
    Number(f64),
    /// UTF-8 text.
    Text(String),
}

impl Value {
    /// Returns the text payload, if this is a `Text` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as `f64` for numeric variants.
    ///
    /// Integers are widened; precision loss above 2^53 is accepted since
    /// numeric constraints are expressed as `f64` bounds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Renders the value back into the raw string a form would submit.
    ///
    /// Parsing the output with the same field rule yields an equal value.
    #[must_use]
    pub fn to_form_string(&self) -> String {
        match self {
            Self::Boolean(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Short name of the variant, used in type-mismatch messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::Text(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_form_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_serializes_as_bare_json_number() {
        let json = serde_json::to_string(&Value::Number(42.5)).unwrap();
        assert_eq!(json, "42.5");
    }

    #[test]
    fn text_serializes_as_bare_json_string() {
        let json = serde_json::to_string(&Value::from("paid")).unwrap();
        assert_eq!(json, "\"paid\"");
    }

    #[test]
    fn integer_widens_to_number() {
        assert_eq!(Value::Integer(7).as_number(), Some(7.0));
        assert_eq!(Value::from("7").as_number(), None);
    }

    #[test]
    fn form_string_of_whole_float_has_no_fraction() {
        assert_eq!(Value::Number(100.0).to_form_string(), "100");
        assert_eq!(Value::Number(0.1).to_form_string(), "0.1");
    }

    #[test]
    fn kind_names() {
        assert_eq!(Value::Boolean(true).kind(), "boolean");
        assert_eq!(Value::Integer(1).kind(), "integer");
        assert_eq!(Value::Number(1.5).kind(), "number");
        assert_eq!(Value::from("x").kind(), "string");
    }
}
