use serde_json::Value;

/// Strips everything but ASCII digits, `.` and `-` before parsing, so
/// `"$1,850"` reads as `1850`. Always returns a finite number.
pub fn parse_or_default(raw: &str, fallback: f64) -> f64 {
    let fallback = if fallback.is_finite() { fallback } else { 0.0 };
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => fallback,
    }
}

pub fn coerce_json(value: &Value, fallback: f64) -> f64 {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(v) if v.is_finite() => v,
            _ => parse_or_default("", fallback),
        },
        Value::String(s) => parse_or_default(s, fallback),
        other => parse_or_default(&other.to_string(), fallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{any, prop_assert, prop_assert_eq, proptest};
    use serde_json::json;

    #[test]
    fn strips_currency_formatting() {
        assert_eq!(parse_or_default("$1,850.25", 0.0), 1_850.25);
        assert_eq!(parse_or_default(" 7.2 % ", 0.0), 7.2);
        assert_eq!(parse_or_default("-300", 0.0), -300.0);
    }

    #[test]
    fn unparseable_remainders_fall_back() {
        assert_eq!(parse_or_default("", 3.0), 3.0);
        assert_eq!(parse_or_default("-", 3.0), 3.0);
        assert_eq!(parse_or_default("1.2.3", 3.0), 3.0);
        assert_eq!(parse_or_default("1-2", 3.0), 3.0);
        assert_eq!(parse_or_default("NaN", 3.0), 3.0);
        assert_eq!(parse_or_default("Infinity", 3.0), 3.0);
    }

    #[test]
    fn exponent_letters_are_stripped_not_interpreted() {
        assert_eq!(parse_or_default("1e3", 0.0), 13.0);
    }

    #[test]
    fn overflowing_digits_fall_back() {
        let huge = "9".repeat(400);
        assert_eq!(parse_or_default(&huge, 5.0), 5.0);
    }

    #[test]
    fn non_finite_fallback_becomes_zero() {
        assert_eq!(parse_or_default("abc", f64::NAN), 0.0);
        assert_eq!(parse_or_default("abc", f64::INFINITY), 0.0);
    }

    #[test]
    fn json_values_coerce_like_text() {
        assert_eq!(coerce_json(&json!(42.5), 0.0), 42.5);
        assert_eq!(coerce_json(&json!("$99"), 0.0), 99.0);
        assert_eq!(coerce_json(&json!(null), 7.0), 7.0);
        assert_eq!(coerce_json(&json!(true), 7.0), 7.0);
        assert_eq!(coerce_json(&json!([]), 7.0), 7.0);
        assert_eq!(coerce_json(&json!({}), 7.0), 7.0);
    }

    #[test]
    fn json_containers_read_their_digits() {
        assert_eq!(coerce_json(&json!([1, 2]), 7.0), 12.0);
        assert_eq!(coerce_json(&json!({"a": 3}), 7.0), 3.0);
    }

    proptest! {
        #[test]
        fn prop_output_is_always_finite(raw in ".*", fallback in any::<f64>()) {
            prop_assert!(parse_or_default(&raw, fallback).is_finite());
        }

        #[test]
        fn prop_text_without_digits_returns_fallback(
            raw in "[^0-9]*",
            fallback in -1.0e12f64..1.0e12
        ) {
            prop_assert_eq!(parse_or_default(&raw, fallback), fallback);
        }

        #[test]
        fn prop_plain_numbers_survive(value in -1.0e9f64..1.0e9) {
            prop_assert_eq!(parse_or_default(&value.to_string(), 0.0), value);
        }
    }
}
