//! Response validation and type coercion
//!
//! Turns one untyped report row into a [`TypedRecord`]. Every catalog field
//! must be present in the row; absent fields are collected across the whole
//! catalog and reported together. Values are coerced by JSON type combined
//! with the field name suffix:
//!
//! | JSON     | field suffix | result              |
//! |----------|--------------|---------------------|
//! | string   | `time`       | `Value::Timestamp`  |
//! | string   | other        | `Value::String`     |
//! | number   | `duration`   | `Value::Duration`   |
//! | number   | other        | `Value::Integer`    |
//! | boolean  | any          | `Value::Boolean`    |
//! | array/object | any      | `Value::Opaque`     |
//! | null     | any          | `Value::Null`       |

use crate::catalog::{Field, FieldCatalog};
use crate::record::{TypedRecord, Value};
use callsync_common::time::parse_datetime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("report row is not a JSON object")]
    NotAnObject,

    #[error("absent fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("field '{field}': invalid timestamp '{value}', expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp { field: String, value: String },

    #[error("field '{field}': expected a whole number, got {value}")]
    NotAnInteger { field: String, value: String },

    #[error("field '{field}': duration of {seconds}s is out of range")]
    DurationOutOfRange { field: String, seconds: i64 },
}

/// Coerce one JSON value according to the field's name
pub fn coerce(field: Field, raw: &serde_json::Value) -> Result<Value, ValidationError> {
    use serde_json::Value as Json;

    match raw {
        Json::Null => Ok(Value::Null),
        Json::String(s) if field.is_time() => parse_datetime(s)
            .map(Value::Timestamp)
            .map_err(|_| ValidationError::InvalidTimestamp {
                field: field.to_string(),
                value: s.clone(),
            }),
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Number(n) => {
            let whole = whole_number(n).ok_or_else(|| ValidationError::NotAnInteger {
                field: field.to_string(),
                value: n.to_string(),
            })?;

            if field.is_duration() {
                chrono::Duration::try_seconds(whole)
                    .map(Value::Duration)
                    .ok_or_else(|| ValidationError::DurationOutOfRange {
                        field: field.to_string(),
                        seconds: whole,
                    })
            } else {
                Ok(Value::Integer(whole))
            }
        },
        Json::Bool(b) => Ok(Value::Boolean(*b)),
        Json::Array(_) | Json::Object(_) => Ok(Value::Opaque(raw.clone())),
    }
}

/// Integral value of `n`; floats qualify only with a zero fraction
fn whole_number(n: &serde_json::Number) -> Option<i64> {
    if let Some(whole) = n.as_i64() {
        return Some(whole);
    }
    let float = n.as_f64()?;
    let in_range = float >= i64::MIN as f64 && float < i64::MAX as f64;
    (float.fract() == 0.0 && in_range).then_some(float as i64)
}

/// Validate a row against `catalog` and coerce every field
///
/// Coercion failures return immediately; missing fields are gathered over the
/// full catalog first so the error names all of them.
pub fn transform(
    catalog: &FieldCatalog,
    row: &serde_json::Value,
) -> Result<TypedRecord, ValidationError> {
    let object = row.as_object().ok_or(ValidationError::NotAnObject)?;

    let mut record = TypedRecord::with_capacity(catalog.len());
    let mut absent = Vec::new();

    for field in catalog.iter() {
        match object.get(field.as_str()) {
            None => absent.push(field.to_string()),
            Some(raw) => record.insert(field, coerce(field, raw)?),
        }
    }

    if !absent.is_empty() {
        return Err(ValidationError::MissingFields(absent));
    }

    Ok(record)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::HashSet;

    fn catalog() -> FieldCatalog {
        FieldCatalog::builder()
            .group(&["id", "start_time", "total_duration", "comment", "is_lost", "call_records"])
            .build()
    }

    fn full_row() -> serde_json::Value {
        json!({
            "id": 7,
            "start_time": "2024-03-01 10:00:00",
            "total_duration": 125,
            "comment": "125",
            "is_lost": false,
            "call_records": ["abc", "def"],
            "extra": "ignored"
        })
    }

    #[test]
    fn test_complete_row_has_exactly_catalog_fields() {
        let record = transform(&catalog(), &full_row()).unwrap();

        let got: HashSet<_> = record.fields().map(|f| f.as_str()).collect();
        let want: HashSet<_> = catalog().iter().map(|f| f.as_str()).collect();
        assert_eq!(got, want);
        assert!(record.get("extra").is_none());
    }

    #[test]
    fn test_suffix_based_coercion() {
        let record = transform(&catalog(), &full_row()).unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(record.get("start_time"), Some(&Value::Timestamp(start)));
        assert_eq!(
            record.get("total_duration"),
            Some(&Value::Duration(chrono::Duration::seconds(125)))
        );
        assert_eq!(record.get("comment"), Some(&Value::String("125".to_string())));
        assert_eq!(record.get("id"), Some(&Value::Integer(7)));
        assert_eq!(record.get("is_lost"), Some(&Value::Boolean(false)));
        assert_eq!(record.get("call_records"), Some(&Value::Opaque(json!(["abc", "def"]))));
        assert_eq!(record.id(), Some(7));
    }

    #[test]
    fn test_null_is_not_coerced() {
        let mut row = full_row();
        row["start_time"] = json!(null);
        row["total_duration"] = json!(null);

        let record = transform(&catalog(), &row).unwrap();
        assert!(record.get("start_time").unwrap().is_null());
        assert!(record.get("total_duration").unwrap().is_null());
    }

    #[test]
    fn test_all_missing_fields_are_reported() {
        let row = json!({ "id": 1, "comment": "x", "is_lost": true });

        match transform(&catalog(), &row) {
            Err(ValidationError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["start_time", "total_duration", "call_records"]);
            },
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_fields_message_names_every_field() {
        let err = transform(&catalog(), &json!({})).unwrap_err();
        let message = err.to_string();
        for name in ["id", "start_time", "total_duration", "comment", "is_lost", "call_records"] {
            assert!(message.contains(name), "{message} lacks {name}");
        }
    }

    #[test]
    fn test_malformed_timestamp_names_field() {
        let mut row = full_row();
        row["start_time"] = json!("01.03.2024 10:00");

        let err = transform(&catalog(), &row).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTimestamp { ref field, .. } if field == "start_time"));
        assert!(err.to_string().contains("start_time"));
    }

    #[test]
    fn test_fractional_number_is_rejected() {
        let err = coerce(Field::new("total_duration"), &json!(12.5)).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnInteger { .. }));

        let err = coerce(Field::new("employee_id"), &json!(1.5)).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnInteger { .. }));
    }

    #[test]
    fn test_zero_fraction_counts_as_whole() {
        assert_eq!(
            coerce(Field::new("total_duration"), &json!(125.0)).unwrap(),
            Value::Duration(chrono::Duration::seconds(125))
        );
        assert_eq!(coerce(Field::new("employee_id"), &json!(-3.0)).unwrap(), Value::Integer(-3));

        let err = coerce(Field::new("id"), &json!(1e20)).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnInteger { .. }));
    }

    #[test]
    fn test_time_suffix_only_applies_to_strings() {
        assert_eq!(coerce(Field::new("finish_time"), &json!(5)).unwrap(), Value::Integer(5));
        assert_eq!(
            coerce(Field::new("duration"), &json!("5")).unwrap(),
            Value::String("5".to_string())
        );
    }

    #[test]
    fn test_non_object_row() {
        assert!(matches!(
            transform(&catalog(), &json!([1, 2])),
            Err(ValidationError::NotAnObject)
        ));
    }
}
