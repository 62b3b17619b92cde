// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Best-guess typing for textual property values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// A property value after coercion. Serializes as the bare JSON value:
/// numbers as numbers, timestamps as RFC 3339 strings, pass-through values
/// as themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Integer(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    Text(String),
    /// Already-typed values (numbers, booleans, null, arrays, objects)
    /// pass through untouched.
    Raw(Value),
}

/// Coerces a raw value into its best-guess typed representation.
///
/// Textual values attempt, in strict order: integral parse, then finite
/// decimal parse, then date/time parse, then the original string. Integers
/// must win over floats, and dates are checked last because numeric strings
/// are far more common. Failed parses fall through; this never fails.
pub fn coerce(raw: &Value) -> PropertyValue {
    match raw {
        Value::String(text) => coerce_text(text),
        other => PropertyValue::Raw(other.clone()),
    }
}

fn coerce_text(text: &str) -> PropertyValue {
    let trimmed = text.trim();
    if let Ok(integral) = trimmed.parse::<i64>() {
        return PropertyValue::Integer(integral);
    }
    if let Ok(decimal) = trimmed.parse::<f64>() {
        // inf/NaN parse but cannot round-trip through JSON
        if decimal.is_finite() {
            return PropertyValue::Float(decimal);
        }
    }
    if let Some(timestamp) = parse_timestamp(trimmed) {
        return PropertyValue::Timestamp(timestamp);
    }
    PropertyValue::Text(text.to_string())
}

// RFC 3339 first, then the two date formats that show up in practice,
// both read as UTC.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc());
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return parsed.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn integral_strings_become_integers() {
        assert_eq!(coerce(&json!("42")), PropertyValue::Integer(42));
        assert_eq!(coerce(&json!("-17")), PropertyValue::Integer(-17));
        assert_eq!(coerce(&json!("007")), PropertyValue::Integer(7));
    }

    #[test]
    fn decimal_strings_become_floats() {
        assert_eq!(coerce(&json!("42.5")), PropertyValue::Float(42.5));
        assert_eq!(coerce(&json!("-0.25")), PropertyValue::Float(-0.25));
        assert_eq!(coerce(&json!("1e3")), PropertyValue::Float(1000.0));
    }

    #[test]
    fn integers_win_over_floats() {
        // "42" parses as f64 too; the integral rule must run first
        assert_eq!(coerce(&json!("42")), PropertyValue::Integer(42));
    }

    #[test]
    fn non_finite_decimals_stay_text() {
        assert_eq!(coerce(&json!("NaN")), PropertyValue::Text("NaN".to_string()));
        assert_eq!(coerce(&json!("inf")), PropertyValue::Text("inf".to_string()));
    }

    #[test]
    fn rfc3339_strings_become_timestamps() {
        let expected = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            coerce(&json!("2023-01-01T00:00:00Z")),
            PropertyValue::Timestamp(expected)
        );
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let expected = Utc.with_ymd_and_hms(2023, 1, 1, 4, 30, 0).unwrap();
        assert_eq!(
            coerce(&json!("2023-01-01T05:30:00+01:00")),
            PropertyValue::Timestamp(expected)
        );
    }

    #[test]
    fn space_separated_datetimes_parse() {
        let expected = Utc.with_ymd_and_hms(2023, 6, 15, 8, 30, 0).unwrap();
        assert_eq!(
            coerce(&json!("2023-06-15 08:30:00")),
            PropertyValue::Timestamp(expected)
        );
    }

    #[test]
    fn bare_dates_parse_as_midnight() {
        let expected = Utc.with_ymd_and_hms(2023, 6, 15, 0, 0, 0).unwrap();
        assert_eq!(
            coerce(&json!("2023-06-15")),
            PropertyValue::Timestamp(expected)
        );
    }

    #[test]
    fn unparsable_strings_pass_through_unchanged() {
        assert_eq!(
            coerce(&json!("hello")),
            PropertyValue::Text("hello".to_string())
        );
        assert_eq!(coerce(&json!("")), PropertyValue::Text(String::new()));
    }

    #[test]
    fn whitespace_is_ignored_for_parsing_but_kept_in_fallback() {
        assert_eq!(coerce(&json!(" 42 ")), PropertyValue::Integer(42));
        assert_eq!(
            coerce(&json!(" hello ")),
            PropertyValue::Text(" hello ".to_string())
        );
    }

    #[test]
    fn already_typed_values_pass_through() {
        assert_eq!(coerce(&json!(7)), PropertyValue::Raw(json!(7)));
        assert_eq!(coerce(&json!(true)), PropertyValue::Raw(json!(true)));
        assert_eq!(coerce(&json!(null)), PropertyValue::Raw(json!(null)));
        assert_eq!(
            coerce(&json!({"nested": [1, 2]})),
            PropertyValue::Raw(json!({"nested": [1, 2]}))
        );
    }

    proptest! {
        #[test]
        fn coercion_never_panics(text in "\\PC*") {
            let _ = coerce(&Value::String(text));
        }

        #[test]
        fn integral_text_always_coerces_to_the_same_integer(value: i64) {
            prop_assert_eq!(
                coerce(&Value::String(value.to_string())),
                PropertyValue::Integer(value)
            );
        }
    }
}
