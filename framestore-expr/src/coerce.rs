//! Normalize predicate literals to the physical type of the target column.
//!
//! `coerce` is a pure function. It never guesses: a literal of the wrong type
//! family is a [`Error::PredicateType`], a literal of the right family whose
//! value cannot be represented (out-of-width integer, non-ISO date text) is a
//! [`Error::PredicateValue`]. Callers rely on that distinction.

use arrow::datatypes::{DataType, TimeUnit};
use chrono::{Datelike, NaiveDate};
use framestore_result::{Error, Result};

use crate::literal::Literal;

/// Days from the proleptic Gregorian epoch (0001-01-01) to 1970-01-01.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

/// A literal coerced into the comparison domain of a concrete column type.
///
/// Signed integers of every width share the `Int` domain after a width check;
/// unsigned widths share `UInt`. Timestamps are normalized to nanoseconds
/// regardless of the column's storage unit.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Int(i64),
    UInt(u64),
    Float32(f32),
    Float64(f64),
    Utf8(String),
    Binary(Vec<u8>),
    /// Days since the Unix epoch.
    Date(i32),
    /// Nanoseconds since the Unix epoch.
    Timestamp(i64),
}

/// Nanoseconds per tick of a timestamp unit.
pub fn nanos_per(unit: &TimeUnit) -> i64 {
    match unit {
        TimeUnit::Second => 1_000_000_000,
        TimeUnit::Millisecond => 1_000_000,
        TimeUnit::Microsecond => 1_000,
        TimeUnit::Nanosecond => 1,
    }
}

/// Coerce `literal` into the comparison domain of a column of `data_type`.
///
/// # Errors
///
/// - [`Error::PredicateType`] when the literal's type family cannot legally
///   compare against the column (e.g. float vs integer column).
/// - [`Error::PredicateValue`] when the family is right but the value is not
///   representable (out-of-range integer, malformed date text).
/// - [`Error::Unsupported`] for column types with no safe comparison domain
///   (`UInt64` and anything outside the supported set).
pub fn coerce(data_type: &DataType, literal: &Literal) -> Result<TypedValue> {
    match data_type {
        DataType::Int8 => coerce_signed(literal, i8::MIN as i128, i8::MAX as i128, "int8"),
        DataType::Int16 => coerce_signed(literal, i16::MIN as i128, i16::MAX as i128, "int16"),
        DataType::Int32 => coerce_signed(literal, i32::MIN as i128, i32::MAX as i128, "int32"),
        DataType::Int64 => coerce_signed(literal, i64::MIN as i128, i64::MAX as i128, "int64"),
        DataType::UInt8 => coerce_unsigned(literal, u8::MAX as i128, "uint8"),
        DataType::UInt16 => coerce_unsigned(literal, u16::MAX as i128, "uint16"),
        DataType::UInt32 => coerce_unsigned(literal, u32::MAX as i128, "uint32"),
        DataType::UInt64 => Err(Error::Unsupported(
            "uint64 columns have no lossless comparison domain for predicates".to_string(),
        )),
        DataType::Float32 => match literal {
            Literal::Float(f) => Ok(TypedValue::Float32(*f as f32)),
            other => Err(type_mismatch("float32", other)),
        },
        DataType::Float64 => match literal {
            Literal::Float(f) => Ok(TypedValue::Float64(*f)),
            other => Err(type_mismatch("float64", other)),
        },
        DataType::Utf8 | DataType::LargeUtf8 => match literal {
            Literal::String(s) => Ok(TypedValue::Utf8(s.clone())),
            Literal::Bytes(b) => match std::str::from_utf8(b) {
                Ok(s) => Ok(TypedValue::Utf8(s.to_string())),
                Err(e) => Err(Error::PredicateValue(format!(
                    "byte literal for utf8 column is not valid UTF-8: {e}"
                ))),
            },
            other => Err(type_mismatch("utf8", other)),
        },
        DataType::Binary | DataType::LargeBinary | DataType::FixedSizeBinary(_) => match literal {
            Literal::Bytes(b) => Ok(TypedValue::Binary(b.clone())),
            Literal::String(s) => Ok(TypedValue::Binary(s.as_bytes().to_vec())),
            other => Err(type_mismatch("binary", other)),
        },
        DataType::Date32 => coerce_date(literal),
        DataType::Timestamp(_, _) => coerce_timestamp(literal),
        // Dictionary encoding is a storage detail; compare in the value domain.
        DataType::Dictionary(_, value) => coerce(value, literal),
        other => Err(Error::Unsupported(format!(
            "predicates are not supported on columns of type {other}"
        ))),
    }
}

fn type_mismatch(expected: &str, got: &Literal) -> Error {
    Error::PredicateType(format!("expected {expected} literal, got {}", got.family()))
}

fn coerce_signed(literal: &Literal, min: i128, max: i128, target: &str) -> Result<TypedValue> {
    match literal {
        Literal::Int(v) => {
            if *v < min || *v > max {
                Err(Error::PredicateValue(format!(
                    "value {v} out of range for {target}"
                )))
            } else {
                Ok(TypedValue::Int(*v as i64))
            }
        }
        other => Err(type_mismatch(target, other)),
    }
}

fn coerce_unsigned(literal: &Literal, max: i128, target: &str) -> Result<TypedValue> {
    match literal {
        Literal::Int(v) => {
            if *v < 0 || *v > max {
                Err(Error::PredicateValue(format!(
                    "value {v} out of range for {target}"
                )))
            } else {
                Ok(TypedValue::UInt(*v as u64))
            }
        }
        other => Err(type_mismatch(target, other)),
    }
}

fn coerce_date(literal: &Literal) -> Result<TypedValue> {
    match literal {
        Literal::Date(d) => Ok(TypedValue::Date(days_since_epoch(d))),
        Literal::String(s) => parse_iso_date(s),
        Literal::Bytes(b) => match std::str::from_utf8(b) {
            Ok(s) => parse_iso_date(s),
            Err(e) => Err(Error::PredicateValue(format!(
                "byte literal for date column is not valid UTF-8: {e}"
            ))),
        },
        // A datetime is a distinct type, not an imprecise date.
        Literal::DateTime(_) | Literal::Timestamp { .. } => Err(Error::PredicateType(
            "expected date literal, got datetime".to_string(),
        )),
        other => Err(type_mismatch("date", other)),
    }
}

fn parse_iso_date(text: &str) -> Result<TypedValue> {
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(d) => Ok(TypedValue::Date(days_since_epoch(&d))),
        Err(_) => Err(Error::PredicateValue(format!(
            "{text:?} is not an ISO date (expected YYYY-MM-DD)"
        ))),
    }
}

fn days_since_epoch(date: &NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_FROM_CE
}

fn coerce_timestamp(literal: &Literal) -> Result<TypedValue> {
    match literal {
        Literal::DateTime(dt) => match dt.and_utc().timestamp_nanos_opt() {
            Some(nanos) => Ok(TypedValue::Timestamp(nanos)),
            None => Err(Error::PredicateValue(format!(
                "datetime {dt} does not fit in nanosecond precision"
            ))),
        },
        Literal::Timestamp { value, unit } => match value.checked_mul(nanos_per(unit)) {
            Some(nanos) => Ok(TypedValue::Timestamp(nanos)),
            None => Err(Error::PredicateValue(format!(
                "timestamp {value} {unit:?} does not fit in nanosecond precision"
            ))),
        },
        // Dates, text, and numbers are distinct families for timestamps.
        other => Err(type_mismatch("timestamp", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn integer_widths_accept_in_range_integers() {
        for dt in [
            DataType::Int8,
            DataType::Int16,
            DataType::Int32,
            DataType::Int64,
        ] {
            assert_eq!(coerce(&dt, &3.into()).unwrap(), TypedValue::Int(3));
        }
        for dt in [DataType::UInt8, DataType::UInt16, DataType::UInt32] {
            assert_eq!(coerce(&dt, &3.into()).unwrap(), TypedValue::UInt(3));
        }
    }

    #[test]
    fn integer_columns_reject_other_families_as_type_errors() {
        for dt in [
            DataType::Int8,
            DataType::Int16,
            DataType::Int32,
            DataType::Int64,
            DataType::UInt8,
            DataType::UInt16,
            DataType::UInt32,
        ] {
            for lit in [
                Literal::Float(3.0),
                Literal::from("3"),
                Literal::from("3.0"),
                Literal::from(b"3"),
                Literal::from(b"3.0"),
            ] {
                assert!(matches!(
                    coerce(&dt, &lit),
                    Err(Error::PredicateType(_)),
                ));
            }
        }
    }

    #[test]
    fn out_of_width_integers_are_value_errors() {
        assert!(matches!(
            coerce(&DataType::Int8, &300.into()),
            Err(Error::PredicateValue(_)),
        ));
        assert!(matches!(
            coerce(&DataType::UInt8, &Literal::Int(-1)),
            Err(Error::PredicateValue(_)),
        ));
    }

    #[test]
    fn uint64_is_unsupported() {
        assert!(matches!(
            coerce(&DataType::UInt64, &3.into()),
            Err(Error::Unsupported(_)),
        ));
    }

    #[test]
    fn float_columns_reject_integers() {
        for dt in [DataType::Float32, DataType::Float64] {
            assert!(matches!(coerce(&dt, &3.into()), Err(Error::PredicateType(_))));
            assert!(coerce(&dt, &Literal::Float(3.0)).is_ok());
        }
    }

    #[test]
    fn string_and_binary_are_interchangeable_domains() {
        assert_eq!(
            coerce(&DataType::Utf8, &Literal::from(b"abc")).unwrap(),
            TypedValue::Utf8("abc".to_string())
        );
        assert_eq!(
            coerce(&DataType::Binary, &Literal::from("abc")).unwrap(),
            TypedValue::Binary(b"abc".to_vec())
        );
        assert!(matches!(
            coerce(&DataType::Utf8, &3.into()),
            Err(Error::PredicateType(_)),
        ));
        assert!(matches!(
            coerce(&DataType::Binary, &Literal::Float(3.0)),
            Err(Error::PredicateType(_)),
        ));
    }

    #[test]
    fn invalid_utf8_bytes_for_string_column_is_value_error() {
        assert!(matches!(
            coerce(&DataType::Utf8, &Literal::Bytes(vec![0xff, 0xfe])),
            Err(Error::PredicateValue(_)),
        ));
    }

    #[test]
    fn date_accepts_date_and_iso_text_forms() {
        let expected = coerce(&DataType::Date32, &date(2018, 1, 5).into()).unwrap();
        assert_eq!(
            coerce(&DataType::Date32, &"2018-01-05".into()).unwrap(),
            expected
        );
        assert_eq!(
            coerce(&DataType::Date32, &Literal::from(b"2018-01-05")).unwrap(),
            expected
        );
        // day 3 of epoch month: 2018-01-05 is 17536 days after 1970-01-01
        assert_eq!(expected, TypedValue::Date(17536));
    }

    #[test]
    fn date_rejects_datetimes_and_numbers_as_type_errors() {
        let dt = date(2018, 1, 1).and_hms_opt(1, 1, 0).unwrap();
        assert!(matches!(
            coerce(&DataType::Date32, &Literal::DateTime(dt)),
            Err(Error::PredicateType(_)),
        ));
        assert!(matches!(
            coerce(&DataType::Date32, &3.into()),
            Err(Error::PredicateType(_)),
        ));
        assert!(matches!(
            coerce(&DataType::Date32, &Literal::Float(3.0)),
            Err(Error::PredicateType(_)),
        ));
    }

    #[test]
    fn non_date_text_is_a_value_error_not_a_type_error() {
        for lit in [
            Literal::from("3"),
            Literal::from("3.0"),
            Literal::from(b"3"),
            Literal::from(b"3.0"),
        ] {
            assert!(matches!(
                coerce(&DataType::Date32, &lit),
                Err(Error::PredicateValue(_)),
            ));
        }
    }

    #[test]
    fn timestamps_normalize_every_unit_to_nanoseconds() {
        let dt: NaiveDateTime = date(2018, 1, 5).and_hms_opt(0, 0, 0).unwrap();
        let nanos = dt.and_utc().timestamp_nanos_opt().unwrap();
        let column = DataType::Timestamp(TimeUnit::Microsecond, None);

        assert_eq!(
            coerce(&column, &Literal::DateTime(dt)).unwrap(),
            TypedValue::Timestamp(nanos)
        );
        for (unit, value) in [
            (TimeUnit::Second, nanos / 1_000_000_000),
            (TimeUnit::Millisecond, nanos / 1_000_000),
            (TimeUnit::Microsecond, nanos / 1_000),
            (TimeUnit::Nanosecond, nanos),
        ] {
            assert_eq!(
                coerce(&column, &Literal::timestamp(value, unit)).unwrap(),
                TypedValue::Timestamp(nanos)
            );
        }
    }

    #[test]
    fn timestamp_rejects_dates_text_and_numbers() {
        let column = DataType::Timestamp(TimeUnit::Nanosecond, None);
        for lit in [
            Literal::Date(date(2018, 1, 4)),
            Literal::from("2018-01-04"),
            Literal::from(b"2018-01-04"),
            Literal::Int(1),
            Literal::Float(1.0),
        ] {
            assert!(matches!(
                coerce(&column, &lit),
                Err(Error::PredicateType(_)),
            ));
        }
    }

    #[test]
    fn dictionary_columns_compare_in_the_value_domain() {
        let dict = DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8));
        assert_eq!(
            coerce(&dict, &"x".into()).unwrap(),
            TypedValue::Utf8("x".to_string())
        );
    }

    #[test]
    fn timestamp_overflow_is_a_value_error() {
        let column = DataType::Timestamp(TimeUnit::Nanosecond, None);
        assert!(matches!(
            coerce(&column, &Literal::timestamp(i64::MAX, TimeUnit::Second)),
            Err(Error::PredicateValue(_)),
        ));
    }
}
