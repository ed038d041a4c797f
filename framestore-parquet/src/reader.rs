//! Selective Parquet decoding: row-group subsets and leaf projection.

use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use framestore_result::Result;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;

/// Decode the given row groups, optionally projecting to a subset of leaf
/// columns. `leaves` are indices into the file schema; the reader yields
/// columns in schema order regardless of the order given here.
pub(crate) fn read_row_groups(
    bytes: Bytes,
    row_groups: Vec<usize>,
    leaves: Option<&[usize]>,
) -> Result<Vec<RecordBatch>> {
    let mut builder = ParquetRecordBatchReaderBuilder::try_new(bytes)?;
    if let Some(leaves) = leaves {
        let mask = ProjectionMask::leaves(builder.parquet_schema(), leaves.iter().copied());
        builder = builder.with_projection(mask);
    }
    let reader = builder.with_row_groups(row_groups).build()?;
    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::write_chunked;
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use parquet::basic::Compression;
    use std::sync::Arc;

    fn two_group_file() -> Bytes {
        let schema = Arc::new(Schema::new(vec![
            Field::new("a", DataType::Int64, false),
            Field::new("b", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3, 4])),
                Arc::new(StringArray::from(vec!["w", "x", "y", "z"])),
            ],
        )
        .unwrap();
        Bytes::from(write_chunked(&batch, Some(2), Compression::SNAPPY).unwrap())
    }

    #[test]
    fn reads_only_requested_row_groups() {
        let batches = read_row_groups(two_group_file(), vec![1], None).unwrap();
        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(rows, 2);
        let first = batches[0]
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(first.value(0), 3);
    }

    #[test]
    fn projection_keeps_schema_order() {
        let batches = read_row_groups(two_group_file(), vec![0, 1], Some(&[1])).unwrap();
        assert_eq!(batches[0].num_columns(), 1);
        assert_eq!(batches[0].schema().field(0).name(), "b");
    }

    #[test]
    fn no_row_groups_yields_no_batches() {
        let batches = read_row_groups(two_group_file(), vec![], None).unwrap();
        assert!(batches.is_empty());
    }
}
