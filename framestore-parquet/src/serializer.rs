//! Store/restore orchestration.
//!
//! `store` appends the label column, splits the frame into row groups and
//! writes one Parquet blob. `restore` reads the footer, coerces the
//! predicate once against the file schema, prunes row groups against their
//! statistics, reads only the leaf columns the projection and predicate
//! need, filters the surviving rows exactly, and finally applies the
//! category / date decode the caller asked for.

use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array};
use arrow::compute::{cast, concat_batches, filter_record_batch};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use framestore_expr::{CoercedPredicate, Predicate};
use framestore_result::{Error, Result};
use framestore_storage::BlobStore;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use tracing::{debug, trace};

use crate::filter::{ArrowRowFilter, RowFilter};
use crate::frame::{DataFrame, INDEX_COLUMN};
use crate::{pruning, reader, writer};

/// Serializes [`DataFrame`]s to chunked Parquet blobs in a [`BlobStore`].
#[derive(Debug, Clone)]
pub struct ParquetSerializer {
    chunk_size: Option<usize>,
    compression: Compression,
}

impl Default for ParquetSerializer {
    fn default() -> Self {
        Self {
            chunk_size: None,
            compression: Compression::SNAPPY,
        }
    }
}

impl ParquetSerializer {
    /// Serializer writing one row group per file, SNAPPY-compressed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write row groups of `chunk_size` rows. A frame of `n` rows produces
    /// `ceil(n / chunk_size)` row groups.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidArgumentError(
                "chunk size must be at least 1".to_string(),
            ));
        }
        self.chunk_size = Some(chunk_size);
        Ok(self)
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Serialize `frame` and store it at `key`. Returns the key the blob
    /// is reachable under.
    pub fn store<S: BlobStore + ?Sized>(
        &self,
        store: &S,
        key: &str,
        frame: &DataFrame,
    ) -> Result<String> {
        let batch = frame.to_storage_batch()?;
        let bytes = writer::write_chunked(&batch, self.chunk_size, self.compression)?;
        debug!(key, rows = frame.num_rows(), bytes = bytes.len(), "stored frame");
        store.put(key, bytes)?;
        Ok(key.to_string())
    }

    /// Restore the frame stored at `key`, applying the projection, predicate
    /// and decode choices in `options`.
    pub fn restore<S: BlobStore + ?Sized>(
        store: &S,
        key: &str,
        options: &RestoreOptions,
    ) -> Result<DataFrame> {
        Self::restore_with_filter(store, key, options, &ArrowRowFilter)
    }

    /// [`restore`](Self::restore) with an explicit exact row filter.
    ///
    /// Row-group pruning is unaffected by the choice of filter; a
    /// pass-through filter exposes exactly which rows each surviving row
    /// group contributed.
    pub fn restore_with_filter<S: BlobStore + ?Sized>(
        store: &S,
        key: &str,
        options: &RestoreOptions,
        row_filter: &dyn RowFilter,
    ) -> Result<DataFrame> {
        let bytes = store.open(key)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(bytes.clone())?;
        let file_schema = builder.schema().clone();
        let metadata = Arc::clone(builder.metadata());
        drop(builder);

        let index_idx = file_schema.index_of(INDEX_COLUMN).map_err(|_| {
            Error::InvalidArgumentError(format!(
                "blob {key:?} has no {INDEX_COLUMN:?} column; not a serialized frame"
            ))
        })?;

        let requested: Vec<String> = match &options.columns {
            None => file_schema
                .fields()
                .iter()
                .filter(|f| f.name() != INDEX_COLUMN)
                .map(|f| f.name().clone())
                .collect(),
            Some(cols) => {
                for col in cols {
                    if col == INDEX_COLUMN || file_schema.column_with_name(col).is_none() {
                        return Err(Error::InvalidArgumentError(format!(
                            "requested column {col:?} is not in the stored table"
                        )));
                    }
                }
                cols.clone()
            }
        };
        for cat in &options.categories {
            if !requested.iter().any(|c| c == cat) {
                return Err(Error::InvalidArgumentError(format!(
                    "category column {cat:?} is not among the restored columns"
                )));
            }
        }

        let predicate: Option<CoercedPredicate> = match &options.predicates {
            Some(pred) => {
                if pred.referenced_columns().contains(&INDEX_COLUMN) {
                    return Err(Error::InvalidArgumentError(format!(
                        "predicates may not reference the reserved column {INDEX_COLUMN:?}"
                    )));
                }
                Some(pred.coerce(&file_schema)?)
            }
            None => None,
        };

        // Leaf columns to read: the projection, every predicate column, and
        // the label column. All supported types are flat, so field indices
        // are leaf indices.
        let mut read_indices: Vec<usize> = Vec::new();
        for name in &requested {
            if let Some((idx, _)) = file_schema.column_with_name(name) {
                read_indices.push(idx);
            }
        }
        if let Some(pred) = &predicate {
            for group in pred.groups() {
                for clause in group {
                    read_indices.push(clause.column_index);
                }
            }
        }
        read_indices.push(index_idx);
        read_indices.sort_unstable();
        read_indices.dedup();

        let total_groups = metadata.num_row_groups();
        let mut selected: Vec<usize> = Vec::with_capacity(total_groups);
        match (&predicate, options.predicate_pushdown) {
            (Some(pred), true) => {
                for i in 0..total_groups {
                    let keep =
                        pruning::row_group_may_match(metadata.row_group(i), &file_schema, pred)?;
                    trace!(row_group = i, keep, "pruning decision");
                    if keep {
                        selected.push(i);
                    }
                }
                debug!(key, total_groups, kept = selected.len(), "pruned row groups");
            }
            _ => selected.extend(0..total_groups),
        }

        let projected = Arc::new(file_schema.project(&read_indices)?);
        let batches = if selected.is_empty() {
            Vec::new()
        } else {
            reader::read_row_groups(bytes, selected, Some(&read_indices))?
        };

        let mut kept = Vec::with_capacity(batches.len());
        for batch in batches {
            match &predicate {
                Some(pred) => {
                    let mask = row_filter.filter(&batch, pred)?;
                    if mask.len() != batch.num_rows() {
                        return Err(Error::Internal(format!(
                            "row filter produced {} mask entries for {} rows",
                            mask.len(),
                            batch.num_rows()
                        )));
                    }
                    kept.push(filter_record_batch(&batch, &mask)?);
                }
                None => kept.push(batch),
            }
        }
        let combined = if kept.is_empty() {
            RecordBatch::new_empty(projected.clone())
        } else {
            concat_batches(&projected, &kept)?
        };

        let index_pos = projected
            .index_of(INDEX_COLUMN)
            .map_err(|_| Error::Internal("label column lost in projection".to_string()))?;
        let index = combined
            .column(index_pos)
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| Error::Internal("label column is not int64".to_string()))?
            .clone();

        let rows = combined.num_rows();
        let mut fields: Vec<Field> = Vec::with_capacity(requested.len());
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(requested.len());
        for name in &requested {
            let (pos, field) = projected.column_with_name(name).ok_or_else(|| {
                Error::Internal(format!("column {name:?} lost in projection"))
            })?;
            let as_category = options.categories.iter().any(|c| c == name);
            let (field, array) = decode_column(
                field,
                combined.column(pos).clone(),
                as_category,
                options.date_as_object,
            )?;
            fields.push(field);
            columns.push(array);
        }
        let batch = RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            columns,
            &RecordBatchOptions::new().with_row_count(Some(rows)),
        )?;
        debug!(key, rows, "restored frame");
        DataFrame::try_new(batch, index)
    }
}

/// Apply restore-time decode choices to one output column.
///
/// `date_as_object` turns Date32 into ISO-8601 text. Category columns are
/// dictionary-encoded over whatever value type the column has at that
/// point, so a date category under `date_as_object` becomes a dictionary
/// of strings.
fn decode_column(
    field: &Field,
    array: ArrayRef,
    as_category: bool,
    date_as_object: bool,
) -> Result<(Field, ArrayRef)> {
    let mut array = array;
    if date_as_object && array.data_type() == &DataType::Date32 {
        array = cast(array.as_ref(), &DataType::Utf8)?;
    }
    if as_category && !matches!(array.data_type(), DataType::Dictionary(_, _)) {
        let target = DataType::Dictionary(
            Box::new(DataType::Int32),
            Box::new(array.data_type().clone()),
        );
        array = cast(array.as_ref(), &target)?;
    }
    let field = Field::new(field.name(), array.data_type().clone(), field.is_nullable());
    Ok((field, array))
}

/// What to restore and how to decode it.
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    columns: Option<Vec<String>>,
    predicates: Option<Predicate>,
    categories: Vec<String>,
    date_as_object: bool,
    predicate_pushdown: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            columns: None,
            predicates: None,
            categories: Vec::new(),
            date_as_object: false,
            predicate_pushdown: true,
        }
    }
}

impl RestoreOptions {
    /// Restore only these columns, in this order. `Some(vec![])` restores
    /// no data columns but still yields the row labels.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Keep only rows matching `predicate`.
    pub fn with_predicates(mut self, predicate: Predicate) -> Self {
        self.predicates = Some(predicate);
        self
    }

    /// Restore these columns dictionary-encoded.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Restore Date32 columns as ISO-8601 text.
    pub fn with_date_as_object(mut self, yes: bool) -> Self {
        self.date_as_object = yes;
        self
    }

    /// Toggle statistics-based row-group pruning. Off, every row group is
    /// read and the exact filter does all the work; results are identical
    /// either way.
    pub fn with_predicate_pushdown(mut self, enabled: bool) -> Self {
        self.predicate_pushdown = enabled;
        self
    }
}
