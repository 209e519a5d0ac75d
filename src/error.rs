use thiserror::Error;

/// Conditions that abort the pipeline for the current workbook. Everything
/// else degrades: bad cells coerce to 0/empty and show up in the affected
/// invoice's `validation_errors` instead of failing the batch.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The workbook bytes could not be decoded at all.
    #[error("Could not open workbook: {0}")]
    Workbook(String),

    /// No usable cells remain after merge fill and border trimming.
    #[error("No data found in the first sheet.")]
    EmptySheet,

    /// Header inference consumed every row; nothing is left to bill.
    #[error("No data rows found below the header block.")]
    NoDataRows,
}
