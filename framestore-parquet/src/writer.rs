//! Chunked Parquet encoding with per-row-group statistics.

use arrow::record_batch::RecordBatch;
use framestore_result::Result;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::{EnabledStatistics, WriterProperties};

/// Encode `batch` into Parquet bytes, one row group per `chunk_size` rows.
///
/// A batch of `n` rows produces exactly `ceil(n / chunk_size)` row groups,
/// all but the last holding `chunk_size` rows. `None` writes a single row
/// group; an empty batch writes none. Row groups are flushed explicitly so
/// the split never depends on the writer's internal buffering.
pub(crate) fn write_chunked(
    batch: &RecordBatch,
    chunk_size: Option<usize>,
    compression: Compression,
) -> Result<Vec<u8>> {
    let rows = batch.num_rows();
    let group_rows = chunk_size.unwrap_or_else(|| rows.max(1));
    let props = WriterProperties::builder()
        .set_compression(compression)
        .set_statistics_enabled(EnabledStatistics::Chunk)
        .set_max_row_group_size(group_rows)
        .build();

    let mut out = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut out, batch.schema(), Some(props))?;
    let mut offset = 0;
    while offset < rows {
        let len = group_rows.min(rows - offset);
        writer.write(&batch.slice(offset, len))?;
        writer.flush()?;
        offset += len;
    }
    writer.close()?;
    Ok(out)
}
