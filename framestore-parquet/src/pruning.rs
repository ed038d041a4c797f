//! Row-group pruning from Parquet min/max statistics.
//!
//! Pruning is conservative. A row group is skipped only when the statistics
//! *prove* that no row can satisfy the predicate; missing statistics, an
//! unrecognized physical type, or any other doubt keeps the group. The exact
//! row filter downstream makes the final call, so a wrongly kept group costs
//! I/O but never correctness.
//!
//! All integer comparisons run in the `i128` domain. Timestamps are widened
//! to nanoseconds before comparing, and unsigned 32-bit columns are re-read
//! from the sign-reinterpreted `i32` statistics Parquet stores for them.
//! Integer statistics are never routed through floating point, which would
//! silently collapse values above 2^53.

use arrow::datatypes::{DataType, Schema};
use framestore_expr::{nanos_per, CoercedClause, CoercedPredicate, CompareOp, TypedValue};
use framestore_result::{Error, Result};
use parquet::file::metadata::RowGroupMetaData;
use parquet::file::statistics::Statistics;

/// Can any row of `row_group` satisfy `predicate`?
///
/// Returns `false` only when every OR-group of the predicate is provably
/// false against the row group's statistics. `schema` must be the file's
/// Arrow schema, whose field order matches the Parquet leaf order the
/// predicate was coerced against.
pub fn row_group_may_match(
    row_group: &RowGroupMetaData,
    schema: &Schema,
    predicate: &CoercedPredicate,
) -> Result<bool> {
    for group in predicate.groups() {
        if group_may_match(row_group, schema, group)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn group_may_match(
    row_group: &RowGroupMetaData,
    schema: &Schema,
    group: &[CoercedClause],
) -> Result<bool> {
    for clause in group {
        if !clause_may_match(row_group, schema, clause)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn clause_may_match(
    row_group: &RowGroupMetaData,
    schema: &Schema,
    clause: &CoercedClause,
) -> Result<bool> {
    if let TypedValue::Binary(b) = &clause.value {
        // Writers truncate byte-array statistics at NUL in ways that make
        // the stored min/max unreliable as bounds. Refuse rather than
        // risk pruning a matching group.
        if b.contains(&0) {
            return Err(Error::Unsupported(format!(
                "binary predicate value with embedded NUL byte cannot be pruned \
                 against statistics (column {:?}); disable predicate pushdown",
                clause.column
            )));
        }
    }
    let column = row_group.column(clause.column_index);
    let Some(stats) = column.statistics() else {
        return Ok(true);
    };
    let mut data_type = schema.field(clause.column_index).data_type();
    if let DataType::Dictionary(_, value) = data_type {
        data_type = value;
    }
    match bounds(stats, data_type, &clause.value) {
        Some(Bounds::Int { min, max, value }) => Ok(may_match(clause.op, &min, &max, &value)),
        Some(Bounds::Float { min, max, value }) => Ok(may_match(clause.op, &min, &max, &value)),
        Some(Bounds::Bytes { min, max, value }) => Ok(may_match(clause.op, &min, &max, &value)),
        None => Ok(true),
    }
}

enum Bounds {
    Int { min: i128, max: i128, value: i128 },
    Float { min: f64, max: f64, value: f64 },
    Bytes {
        min: Vec<u8>,
        max: Vec<u8>,
        value: Vec<u8>,
    },
}

/// Lift statistics and predicate value into a common comparison domain.
/// `None` means the combination is not understood and the group is kept.
fn bounds(stats: &Statistics, data_type: &DataType, value: &TypedValue) -> Option<Bounds> {
    match (stats, value) {
        (Statistics::Int32(s), TypedValue::Int(v)) => Some(Bounds::Int {
            min: *s.min_opt()? as i128,
            max: *s.max_opt()? as i128,
            value: *v as i128,
        }),
        // Unsigned 32-bit values are stored sign-reinterpreted in i32
        // statistics; read them back through u32.
        (Statistics::Int32(s), TypedValue::UInt(v)) => Some(Bounds::Int {
            min: (*s.min_opt()? as u32) as i128,
            max: (*s.max_opt()? as u32) as i128,
            value: *v as i128,
        }),
        (Statistics::Int32(s), TypedValue::Date(v)) => Some(Bounds::Int {
            min: *s.min_opt()? as i128,
            max: *s.max_opt()? as i128,
            value: *v as i128,
        }),
        (Statistics::Int64(s), TypedValue::Int(v)) => Some(Bounds::Int {
            min: *s.min_opt()? as i128,
            max: *s.max_opt()? as i128,
            value: *v as i128,
        }),
        (Statistics::Int64(s), TypedValue::Timestamp(ns)) => {
            let DataType::Timestamp(unit, _) = data_type else {
                return None;
            };
            let factor = nanos_per(unit) as i128;
            Some(Bounds::Int {
                min: *s.min_opt()? as i128 * factor,
                max: *s.max_opt()? as i128 * factor,
                value: *ns as i128,
            })
        }
        (Statistics::Float(s), TypedValue::Float32(v)) => Some(Bounds::Float {
            min: *s.min_opt()? as f64,
            max: *s.max_opt()? as f64,
            value: *v as f64,
        }),
        (Statistics::Double(s), TypedValue::Float64(v)) => Some(Bounds::Float {
            min: *s.min_opt()?,
            max: *s.max_opt()?,
            value: *v,
        }),
        (Statistics::ByteArray(s), TypedValue::Utf8(v)) => Some(Bounds::Bytes {
            min: s.min_opt()?.data().to_vec(),
            max: s.max_opt()?.data().to_vec(),
            value: v.as_bytes().to_vec(),
        }),
        (Statistics::ByteArray(s), TypedValue::Binary(v)) => Some(Bounds::Bytes {
            min: s.min_opt()?.data().to_vec(),
            max: s.max_opt()?.data().to_vec(),
            value: v.clone(),
        }),
        (Statistics::FixedLenByteArray(s), TypedValue::Binary(v)) => Some(Bounds::Bytes {
            min: s.min_opt()?.data().to_vec(),
            max: s.max_opt()?.data().to_vec(),
            value: v.clone(),
        }),
        _ => None,
    }
}

/// The clause `column <op> value` is satisfiable by some row whose column
/// value lies in `[min, max]` exactly under these conditions.
fn may_match<T: PartialOrd + ?Sized>(op: CompareOp, min: &T, max: &T, value: &T) -> bool {
    match op {
        CompareOp::Eq => value >= min && value <= max,
        CompareOp::Lt => min < value,
        CompareOp::LtEq => min <= value,
        CompareOp::Gt => max > value,
        CompareOp::GtEq => max >= value,
    }
}
