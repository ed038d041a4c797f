//! Exact per-row predicate evaluation over Arrow batches.
//!
//! Pruning decides which row groups are worth reading; this module decides
//! which rows survive. Clauses are evaluated with the vectorized comparison
//! kernels against a single-element scalar of the column's exact type, then
//! combined with Kleene logic (AND within a group, OR across groups). Null
//! comparison results resolve to "no match" before the mask is applied.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BinaryArray, BooleanArray, Date32Array, FixedSizeBinaryArray, Float32Array,
    Float64Array, Int16Array, Int32Array, Int64Array, Int8Array, LargeBinaryArray,
    LargeStringArray, Scalar, StringArray, TimestampMicrosecondArray, TimestampMillisecondArray,
    TimestampNanosecondArray, TimestampSecondArray, UInt16Array, UInt32Array, UInt8Array,
};
use arrow::compute::kernels::cmp::{eq, gt, gt_eq, lt, lt_eq};
use arrow::compute::{and_kleene, cast, or_kleene, prep_null_mask_filter};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use framestore_expr::{nanos_per, CoercedClause, CoercedPredicate, CompareOp, TypedValue};
use framestore_result::{Error, Result};

/// Pluggable exact row filter.
///
/// The restore path always runs the predicate through this trait, so a
/// custom implementation can observe exactly which rows each surviving
/// chunk contributes (or deliberately pass everything through, making
/// row-group pruning the only filtering in effect).
pub trait RowFilter: Send + Sync {
    /// Produce a null-free boolean mask with one entry per row of `batch`.
    fn filter(&self, batch: &RecordBatch, predicate: &CoercedPredicate) -> Result<BooleanArray>;
}

/// Default filter backed by the Arrow comparison kernels.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrowRowFilter;

impl RowFilter for ArrowRowFilter {
    fn filter(&self, batch: &RecordBatch, predicate: &CoercedPredicate) -> Result<BooleanArray> {
        let mut combined: Option<BooleanArray> = None;
        for group in predicate.groups() {
            let mut group_mask: Option<BooleanArray> = None;
            for clause in group {
                let mask = clause_mask(batch, clause)?;
                group_mask = Some(match group_mask {
                    Some(acc) => and_kleene(&acc, &mask)?,
                    None => mask,
                });
            }
            let group_mask = group_mask
                .ok_or_else(|| Error::Internal("empty conjunction group".to_string()))?;
            combined = Some(match combined {
                Some(acc) => or_kleene(&acc, &group_mask)?,
                None => group_mask,
            });
        }
        let mask = combined.ok_or_else(|| Error::Internal("empty predicate".to_string()))?;
        Ok(if mask.null_count() > 0 {
            prep_null_mask_filter(&mask)
        } else {
            mask
        })
    }
}

fn clause_mask(batch: &RecordBatch, clause: &CoercedClause) -> Result<BooleanArray> {
    let column = batch.column_by_name(&clause.column).ok_or_else(|| {
        Error::Internal(format!(
            "column {:?} missing from projected chunk",
            clause.column
        ))
    })?;
    let mut column = column.clone();
    if let DataType::Dictionary(_, value) = column.data_type() {
        let value = value.as_ref().clone();
        column = cast(column.as_ref(), &value)?;
    }
    match (column.data_type().clone(), &clause.value) {
        (DataType::Timestamp(unit, tz), TypedValue::Timestamp(nanos)) => {
            timestamp_mask(&column, &unit, &tz, *nanos, clause.op)
        }
        (DataType::FixedSizeBinary(width), TypedValue::Binary(b))
            if b.len() != width as usize =>
        {
            // No fixed-width value of a different length can be equal;
            // ordering against one is not defined.
            match clause.op {
                CompareOp::Eq => Ok(BooleanArray::from(vec![false; column.len()])),
                op => Err(Error::PredicateValue(format!(
                    "cannot order fixed-size binary column of width {width} \
                     against a {}-byte value with {op}",
                    b.len()
                ))),
            }
        }
        (data_type, value) => {
            let scalar = scalar_array(&data_type, value)?;
            apply_cmp(clause.op, &column, &scalar)
        }
    }
}

fn apply_cmp(op: CompareOp, column: &ArrayRef, scalar: &ArrayRef) -> Result<BooleanArray> {
    let rhs = Scalar::new(scalar.clone());
    let mask = match op {
        CompareOp::Eq => eq(column, &rhs)?,
        CompareOp::Lt => lt(column, &rhs)?,
        CompareOp::LtEq => lt_eq(column, &rhs)?,
        CompareOp::Gt => gt(column, &rhs)?,
        CompareOp::GtEq => gt_eq(column, &rhs)?,
    };
    Ok(mask)
}

/// Single-element array of the column's exact type holding the coerced value.
fn scalar_array(data_type: &DataType, value: &TypedValue) -> Result<ArrayRef> {
    let array: ArrayRef = match (data_type, value) {
        (DataType::Int8, TypedValue::Int(v)) => Arc::new(Int8Array::from(vec![*v as i8])),
        (DataType::Int16, TypedValue::Int(v)) => Arc::new(Int16Array::from(vec![*v as i16])),
        (DataType::Int32, TypedValue::Int(v)) => Arc::new(Int32Array::from(vec![*v as i32])),
        (DataType::Int64, TypedValue::Int(v)) => Arc::new(Int64Array::from(vec![*v])),
        (DataType::UInt8, TypedValue::UInt(v)) => Arc::new(UInt8Array::from(vec![*v as u8])),
        (DataType::UInt16, TypedValue::UInt(v)) => Arc::new(UInt16Array::from(vec![*v as u16])),
        (DataType::UInt32, TypedValue::UInt(v)) => Arc::new(UInt32Array::from(vec![*v as u32])),
        (DataType::Float32, TypedValue::Float32(v)) => Arc::new(Float32Array::from(vec![*v])),
        (DataType::Float64, TypedValue::Float64(v)) => Arc::new(Float64Array::from(vec![*v])),
        (DataType::Utf8, TypedValue::Utf8(s)) => Arc::new(StringArray::from(vec![s.as_str()])),
        (DataType::LargeUtf8, TypedValue::Utf8(s)) => {
            Arc::new(LargeStringArray::from(vec![s.as_str()]))
        }
        (DataType::Binary, TypedValue::Binary(b)) => {
            Arc::new(BinaryArray::from_vec(vec![b.as_slice()]))
        }
        (DataType::LargeBinary, TypedValue::Binary(b)) => {
            Arc::new(LargeBinaryArray::from_vec(vec![b.as_slice()]))
        }
        (DataType::FixedSizeBinary(_), TypedValue::Binary(b)) => Arc::new(
            FixedSizeBinaryArray::try_from_iter(std::iter::once(b.as_slice()))
                .map_err(Error::Arrow)?,
        ),
        (DataType::Date32, TypedValue::Date(d)) => Arc::new(Date32Array::from(vec![*d])),
        (dt, v) => {
            return Err(Error::Internal(format!(
                "coerced value {v:?} does not match column type {dt}"
            )))
        }
    };
    Ok(array)
}

/// Compare a timestamp column against a nanosecond instant.
///
/// The instant is converted to the column's tick unit with the rounding
/// direction that preserves the comparison: `Eq` with a remainder can never
/// match, strict bounds round toward the excluded side, inclusive bounds
/// toward the included side.
fn timestamp_mask(
    column: &ArrayRef,
    unit: &TimeUnit,
    tz: &Option<Arc<str>>,
    nanos: i64,
    op: CompareOp,
) -> Result<BooleanArray> {
    let factor = nanos_per(unit);
    let floor = nanos.div_euclid(factor);
    let ceil = -((-nanos).div_euclid(factor));
    let (ticks, op) = match op {
        CompareOp::Eq => {
            if nanos.rem_euclid(factor) != 0 {
                return Ok(BooleanArray::from(vec![false; column.len()]));
            }
            (floor, CompareOp::Eq)
        }
        CompareOp::Lt => (ceil, CompareOp::Lt),
        CompareOp::LtEq => (floor, CompareOp::LtEq),
        CompareOp::Gt => (floor, CompareOp::Gt),
        CompareOp::GtEq => (ceil, CompareOp::GtEq),
    };
    let scalar: ArrayRef = match unit {
        TimeUnit::Second => {
            Arc::new(TimestampSecondArray::from(vec![ticks]).with_timezone_opt(tz.clone()))
        }
        TimeUnit::Millisecond => {
            Arc::new(TimestampMillisecondArray::from(vec![ticks]).with_timezone_opt(tz.clone()))
        }
        TimeUnit::Microsecond => {
            Arc::new(TimestampMicrosecondArray::from(vec![ticks]).with_timezone_opt(tz.clone()))
        }
        TimeUnit::Nanosecond => {
            Arc::new(TimestampNanosecondArray::from(vec![ticks]).with_timezone_opt(tz.clone()))
        }
    };
    apply_cmp(op, column, &scalar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{Field, Schema};
    use framestore_expr::{Clause, Literal, Predicate};

    fn mask_for(batch: &RecordBatch, predicate: Predicate) -> Vec<bool> {
        let coerced = predicate.coerce(batch.schema().as_ref()).unwrap();
        let mask = ArrowRowFilter.filter(batch, &coerced).unwrap();
        assert_eq!(mask.null_count(), 0);
        (0..mask.len()).map(|i| mask.value(i)).collect()
    }

    fn int_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("a", DataType::Int64, false),
            Field::new("b", DataType::Utf8, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3, 4])),
                Arc::new(StringArray::from(vec![
                    Some("w"),
                    None,
                    Some("y"),
                    Some("z"),
                ])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn single_clause_masks() {
        let batch = int_batch();
        let p = |c: Clause| Predicate::all_of(vec![c]).unwrap();
        assert_eq!(
            mask_for(&batch, p(Clause::new("a", CompareOp::Eq, 3))),
            vec![false, false, true, false]
        );
        assert_eq!(
            mask_for(&batch, p(Clause::new("a", CompareOp::Lt, 3))),
            vec![true, true, false, false]
        );
        assert_eq!(
            mask_for(&batch, p(Clause::new("a", CompareOp::GtEq, 3))),
            vec![false, false, true, true]
        );
    }

    #[test]
    fn null_values_never_match() {
        let batch = int_batch();
        assert_eq!(
            mask_for(
                &batch,
                Predicate::all_of(vec![Clause::new("b", CompareOp::Gt, "x")]).unwrap()
            ),
            vec![false, false, true, true]
        );
        // ... even under OR where the other side is false.
        assert_eq!(
            mask_for(
                &batch,
                Predicate::from_dnf(vec![
                    vec![Clause::new("b", CompareOp::Eq, "w")],
                    vec![Clause::new("b", CompareOp::Eq, "nope")],
                ])
                .unwrap()
            ),
            vec![true, false, false, false]
        );
    }

    #[test]
    fn and_within_group_or_across_groups() {
        let batch = int_batch();
        let pred = Predicate::from_dnf(vec![
            vec![
                Clause::new("a", CompareOp::Gt, 1),
                Clause::new("a", CompareOp::Lt, 4),
            ],
            vec![Clause::new("b", CompareOp::Eq, "z")],
        ])
        .unwrap();
        assert_eq!(mask_for(&batch, pred), vec![false, true, true, true]);
    }

    #[test]
    fn timestamp_literal_converts_to_column_unit() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "ts",
            DataType::Timestamp(TimeUnit::Second, None),
            false,
        )]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(TimestampSecondArray::from(vec![1, 2, 3]))],
        )
        .unwrap();
        let p = |op, value, unit| {
            Predicate::all_of(vec![Clause::new("ts", op, Literal::timestamp(value, unit))])
                .unwrap()
        };
        // 2_000 ms lands exactly on tick 2
        assert_eq!(
            mask_for(&batch, p(CompareOp::Eq, 2_000, TimeUnit::Millisecond)),
            vec![false, true, false]
        );
        // 1_500 ms can never equal a whole second
        assert_eq!(
            mask_for(&batch, p(CompareOp::Eq, 1_500, TimeUnit::Millisecond)),
            vec![false, false, false]
        );
        // t < 1.5s: only t == 1
        assert_eq!(
            mask_for(&batch, p(CompareOp::Lt, 1_500, TimeUnit::Millisecond)),
            vec![true, false, false]
        );
        // t <= 1.5s: still only t == 1
        assert_eq!(
            mask_for(&batch, p(CompareOp::LtEq, 1_500, TimeUnit::Millisecond)),
            vec![true, false, false]
        );
        // t > 1.5s: t in {2, 3}
        assert_eq!(
            mask_for(&batch, p(CompareOp::Gt, 1_500, TimeUnit::Millisecond)),
            vec![false, true, true]
        );
        // t >= 2s exactly
        assert_eq!(
            mask_for(&batch, p(CompareOp::GtEq, 2_000, TimeUnit::Millisecond)),
            vec![false, true, true]
        );
    }

    #[test]
    fn dictionary_columns_are_compared_by_value() {
        use arrow::array::DictionaryArray;
        use arrow::datatypes::Int32Type;

        let dict: DictionaryArray<Int32Type> =
            vec!["red", "blue", "red"].into_iter().collect();
        let schema = Arc::new(Schema::new(vec![Field::new(
            "color",
            dict.data_type().clone(),
            false,
        )]));
        let batch = RecordBatch::try_new(schema, vec![Arc::new(dict)]).unwrap();
        assert_eq!(
            mask_for(
                &batch,
                Predicate::all_of(vec![Clause::new("color", CompareOp::Eq, "red")]).unwrap()
            ),
            vec![true, false, true]
        );
    }

    #[test]
    fn fixed_size_binary_length_mismatch() {
        let array = FixedSizeBinaryArray::try_from_iter(
            vec![&b"ab"[..], &b"cd"[..]].into_iter(),
        )
        .unwrap();
        let schema = Arc::new(Schema::new(vec![Field::new(
            "f",
            array.data_type().clone(),
            false,
        )]));
        let batch = RecordBatch::try_new(schema, vec![Arc::new(array)]).unwrap();
        // Eq against a different length is simply never true.
        assert_eq!(
            mask_for(
                &batch,
                Predicate::all_of(vec![Clause::new("f", CompareOp::Eq, b"abc")]).unwrap()
            ),
            vec![false, false]
        );
        // Ordering against a different length is an error.
        let pred = Predicate::all_of(vec![Clause::new("f", CompareOp::Lt, b"abc")])
            .unwrap()
            .coerce(batch.schema().as_ref())
            .unwrap();
        assert!(matches!(
            ArrowRowFilter.filter(&batch, &pred),
            Err(Error::PredicateValue(_))
        ));
    }
}
