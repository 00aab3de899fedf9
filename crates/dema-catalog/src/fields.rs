//! Field access helpers for schema-less catalog records.
//!
//! Extracted catalogs are loose about types: a series id can be a string or
//! a number, empty strings stand in for missing values. These helpers give
//! every caller the same notion of "present".

use dema_core::scalar_text;
use serde_json::Value;

use crate::RawProduct;

/// Text form of a field that counts as present: a non-empty string or a
/// non-zero number. Numbers are rendered with [`scalar_text`].
pub(crate) fn present_text(record: &RawProduct, key: &str) -> Option<String> {
    let value = record.get(key)?;
    let present = match value {
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    };
    if present {
        scalar_text(value)
    } else {
        None
    }
}

/// First present field among `keys`, in order.
pub(crate) fn first_present(record: &RawProduct, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| present_text(record, key))
}

/// Whether a value should be copied into a properties/attributes map.
pub(crate) fn is_meaningful(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Positive numeric value of a field. Strings are not coerced.
pub(crate) fn positive_number(value: Option<&Value>) -> Option<f64> {
    value
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite() && *v > 0.0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> RawProduct {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn present_text_skips_empty_and_zero() {
        let r = record(json!({"a": "", "b": 0, "c": null, "d": false}));
        for key in ["a", "b", "c", "d", "missing"] {
            assert_eq!(present_text(&r, key), None, "key {key}");
        }
    }

    #[test]
    fn present_text_stringifies_numbers() {
        let r = record(json!({"series_id": 42}));
        assert_eq!(present_text(&r, "series_id").as_deref(), Some("42"));
    }

    #[test]
    fn present_text_drops_fraction_of_integral_floats() {
        let r = record(json!({"whole": 1.0, "half": 0.5, "neg": -4.0}));
        assert_eq!(present_text(&r, "whole").as_deref(), Some("1"));
        assert_eq!(present_text(&r, "half").as_deref(), Some("0.5"));
        assert_eq!(present_text(&r, "neg").as_deref(), Some("-4"));
    }

    #[test]
    fn first_present_respects_order() {
        let r = record(json!({"type": "T1", "series_name": "S1"}));
        assert_eq!(
            first_present(&r, &["series_id", "series_name", "type"]).as_deref(),
            Some("S1")
        );
    }

    #[test]
    fn positive_number_rejects_strings_and_non_positive() {
        assert_eq!(positive_number(Some(&json!("12"))), None);
        assert_eq!(positive_number(Some(&json!(0))), None);
        assert_eq!(positive_number(Some(&json!(-1.5))), None);
        assert_eq!(positive_number(Some(&json!(2.5))), Some(2.5));
        assert_eq!(positive_number(None), None);
    }
}
