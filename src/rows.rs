//! Row normalization: post-header grid rows -> uniform key-value records.

use crate::error::PipelineError;
use crate::grid::Grid;
use crate::header::HeaderInfo;
use crate::types::Record;

/// Zip each data row with the inferred column names. Rows are padded or
/// truncated to the table width; all-empty rows are dropped.
pub fn normalize_rows(grid: &Grid, header: &HeaderInfo) -> Result<Vec<Record>, PipelineError> {
    let mut records = Vec::new();
    for row in grid.iter().skip(header.data_start) {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let mut record = Record::with_capacity(header.columns.len());
        for (i, name) in header.columns.iter().enumerate() {
            record.insert(name.clone(), row.get(i).cloned().unwrap_or_default());
        }
        records.push(record);
    }
    if records.is_empty() {
        return Err(PipelineError::NoDataRows);
    }
    Ok(records)
}
