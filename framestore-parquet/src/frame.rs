//! Labeled table: an Arrow `RecordBatch` paired with row-index labels.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array};
use arrow::compute::{concat, concat_batches};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use framestore_result::{Error, Result};

/// Reserved name of the Int64 column that carries row-index labels inside
/// a serialized file. User schemas must not contain a column of this name.
pub const INDEX_COLUMN: &str = "__frame_index__";

/// A `RecordBatch` with one Int64 label per row.
///
/// Labels survive a store/restore round trip, including restores that
/// project away every data column. They are ordinary values, not positions:
/// after predicate filtering the surviving rows keep their original labels.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    batch: RecordBatch,
    index: Int64Array,
}

impl DataFrame {
    /// Pair `batch` with explicit row labels.
    pub fn try_new(batch: RecordBatch, index: Int64Array) -> Result<Self> {
        if batch.num_rows() != index.len() {
            return Err(Error::InvalidArgumentError(format!(
                "index length {} does not match row count {}",
                index.len(),
                batch.num_rows()
            )));
        }
        if index.null_count() > 0 {
            return Err(Error::InvalidArgumentError(
                "index labels must not be null".into(),
            ));
        }
        Ok(Self { batch, index })
    }

    /// Pair `batch` with the default positional labels `0..num_rows`.
    pub fn from_batch(batch: RecordBatch) -> Self {
        let index = Int64Array::from_iter_values(0..batch.num_rows() as i64);
        Self { batch, index }
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn index(&self) -> &Int64Array {
        &self.index
    }

    pub fn column_by_name(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// Zero-copy slice of rows `[offset, offset + length)`.
    pub fn slice(&self, offset: usize, length: usize) -> Self {
        Self {
            batch: self.batch.slice(offset, length),
            index: self.index.slice(offset, length),
        }
    }

    /// Concatenate frames sharing `schema`, preserving label order.
    pub fn concat(schema: &SchemaRef, frames: &[DataFrame]) -> Result<Self> {
        let batches: Vec<RecordBatch> = frames.iter().map(|f| f.batch.clone()).collect();
        let batch = concat_batches(schema, &batches)?;
        let indices: Vec<&dyn Array> = frames.iter().map(|f| &f.index as &dyn Array).collect();
        let index = if indices.is_empty() {
            Int64Array::from(Vec::<i64>::new())
        } else {
            concat(&indices)?
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| Error::Internal("index concat produced a non-Int64 array".into()))?
                .clone()
        };
        Self::try_new(batch, index)
    }

    /// The on-disk layout: data columns plus a trailing [`INDEX_COLUMN`].
    pub(crate) fn to_storage_batch(&self) -> Result<RecordBatch> {
        let schema = self.batch.schema();
        if schema.column_with_name(INDEX_COLUMN).is_some() {
            return Err(Error::InvalidArgumentError(format!(
                "column name {INDEX_COLUMN:?} is reserved"
            )));
        }
        let mut fields: Vec<Field> = schema
            .fields()
            .iter()
            .map(|f| f.as_ref().clone())
            .collect();
        fields.push(Field::new(INDEX_COLUMN, DataType::Int64, false));
        let mut columns: Vec<ArrayRef> = self.batch.columns().to_vec();
        columns.push(Arc::new(self.index.clone()));
        Ok(RecordBatch::try_new(
            Arc::new(Schema::new(fields)),
            columns,
        )?)
    }
}
