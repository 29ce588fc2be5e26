//! Type-aware value coercion shared by the filter and aggregation engines.
//!
//! Record values are duck-typed per field kind; this module is the single
//! place that interprets them. Both engines call through here so a currency
//! string compares and sums identically everywhere.

use serde_json::Value;

/// Coerce a raw record value to a number.
///
/// Strings keep only ASCII digits and commas, then the comma becomes the
/// decimal separator: `"R$ 5.400,00"` → `5400.0`. The thousands dot is
/// dropped by the digit filter, which is what makes the Brazilian format
/// work; this rule is load-bearing for stored data and must not be
/// "fixed" to a locale-neutral parse. Values that still fail to parse
/// coerce to `0.0`.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::Null => 0.0,
        other => {
            let raw = stringify(other);
            let cleaned: String = raw
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == ',')
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
    }
}

/// Render a raw record value as display text.
///
/// Null becomes the empty string; arrays join their elements so a file list
/// is searchable as one string.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(stringify)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Uniform emptiness test across all field kinds.
///
/// A value is empty when it is absent, JSON null, the empty string, or an
/// array of length zero.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_brazilian_currency() {
        assert_eq!(coerce_number(&json!("R$ 5.400,00")), 5400.0);
        assert_eq!(coerce_number(&json!("R$ 2.100,00")), 2100.0);
        assert_eq!(coerce_number(&json!("1.234.567,89")), 1234567.89);
    }

    #[test]
    fn coerce_plain_strings() {
        assert_eq!(coerce_number(&json!("42")), 42.0);
        assert_eq!(coerce_number(&json!("3,5")), 3.5);
        assert_eq!(coerce_number(&json!("")), 0.0);
        assert_eq!(coerce_number(&json!("sem valor")), 0.0);
    }

    #[test]
    fn coerce_json_numbers_pass_through() {
        assert_eq!(coerce_number(&json!(5400.5)), 5400.5);
        assert_eq!(coerce_number(&json!(-3)), -3.0);
    }

    #[test]
    fn coerce_null_is_zero() {
        assert_eq!(coerce_number(&Value::Null), 0.0);
    }

    #[test]
    fn coerce_unparseable_after_cleanup_is_zero() {
        // Two decimal commas survive the filter and break the parse.
        assert_eq!(coerce_number(&json!("1,2,3")), 0.0);
    }

    #[test]
    fn stringify_shapes() {
        assert_eq!(stringify(&Value::Null), "");
        assert_eq!(stringify(&json!("abc")), "abc");
        assert_eq!(stringify(&json!(12)), "12");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!(["a.pdf", "b.pdf"])), "a.pdf, b.pdf");
    }

    #[test]
    fn emptiness_is_uniform() {
        assert!(is_empty_value(None));
        assert!(is_empty_value(Some(&Value::Null)));
        assert!(is_empty_value(Some(&json!(""))));
        assert!(is_empty_value(Some(&json!([]))));

        assert!(!is_empty_value(Some(&json!("x"))));
        assert!(!is_empty_value(Some(&json!(["a.pdf"]))));
        assert!(!is_empty_value(Some(&json!(0))));
        assert!(!is_empty_value(Some(&json!(false))));
    }
}
