//! invoice-mill: spreadsheet workbooks in, paginated PDF invoices out.
//!
//! The pipeline is a chain of pure stages: decode bytes into a sparse
//! sheet, reconstruct a dense grid, infer headers, normalize rows into
//! records, group records into invoices under a column mapping, and lay
//! each invoice out as A4 pages that render to PDF. Re-running any stage
//! on the same inputs gives identical output, so batch rendering across
//! invoices can be parallelized freely by the caller.

mod error;
mod excel;
mod export;
mod fonts;
mod grid;
mod header;
mod invoice;
mod layout;
mod money;
mod pdf;
mod rows;
mod types;

use chrono::NaiveDate;
use log::debug;

pub use error::PipelineError;
pub use excel::decode_workbook;
pub use export::{sanitize_filename, InvoiceBundle};
pub use grid::{reconstruct_grid, trim_grid, Grid};
pub use header::{infer_headers, HeaderInfo};
pub use invoice::group_invoices;
pub use layout::{layout_invoice, DrawOp, LayoutPage};
pub use money::format_money;
pub use pdf::render_pages;
pub use rows::normalize_rows;
pub use types::{
    Cell, CellValue, Invoice, InvoiceLine, Mapping, MergeRange, Record, Settings, Sheet,
    NO_GROUPING,
};

/// Everything the preview/selection UI needs from one processed workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Inferred column names, for the mapping UI.
    pub headers: Vec<String>,
    /// Computed invoices, `_index`-ordered, validation errors attached.
    pub invoices: Vec<Invoice>,
}

/// Run the whole pipeline on decoded workbook bytes. `today` feeds the
/// synthetic invoice numbers of grouped mode; pass a fixed date for
/// reproducible output.
pub fn run_pipeline(
    bytes: &[u8],
    mapping: &Mapping,
    today: NaiveDate,
) -> Result<PipelineOutput, PipelineError> {
    let sheet = excel::decode_workbook(bytes)?;
    process_sheet(&sheet, mapping, today)
}

/// Pipeline minus byte decoding, for callers that already hold a `Sheet`.
pub fn process_sheet(
    sheet: &Sheet,
    mapping: &Mapping,
    today: NaiveDate,
) -> Result<PipelineOutput, PipelineError> {
    let grid = grid::reconstruct_grid(sheet)?;
    let header = header::infer_headers(&grid);
    debug!(
        "inferred {} columns, header depth {}",
        header.columns.len(),
        header.depth
    );
    let records = rows::normalize_rows(&grid, &header)?;
    let invoices = invoice::group_invoices(&records, mapping, today);
    Ok(PipelineOutput {
        headers: header.columns,
        invoices,
    })
}

/// Render one invoice to PDF bytes.
pub fn render_invoice(invoice: &Invoice, settings: &Settings) -> Vec<u8> {
    pdf::render_pages(&layout::layout_invoice(invoice, settings))
}
