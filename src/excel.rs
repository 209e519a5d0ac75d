//! Workbook decoding: raw bytes -> `Sheet` (first worksheet only).

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use log::debug;

use crate::error::PipelineError;
use crate::types::{Cell, CellValue, MergeRange, Sheet};

/// Decode already-read workbook bytes and extract the first sheet as a
/// sparse cell map plus its merge ranges. Merged regions are only exposed
/// by the xlsx backend; other formats decode with an empty merge list.
pub fn decode_workbook(bytes: &[u8]) -> Result<Sheet, PipelineError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| PipelineError::Workbook(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| PipelineError::Workbook("Workbook has no sheets.".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| PipelineError::Workbook(format!("Sheet not readable: {}", e)))?;

    let mut sheet = Sheet::default();
    for (row, col, data) in range.used_cells() {
        let value = convert(data);
        if value == CellValue::Empty {
            continue;
        }
        sheet
            .cells
            .insert((row as u32, col as u32), Cell::new(value));
    }

    if let Sheets::Xlsx(xlsx) = &mut workbook {
        if xlsx.load_merged_regions().is_ok() {
            sheet.merges = xlsx
                .merged_regions_by_sheet(&sheet_name)
                .iter()
                .map(|(_, _, dims)| MergeRange {
                    start_row: dims.start.0,
                    start_col: dims.start.1,
                    end_row: dims.end.0,
                    end_col: dims.end.1,
                })
                .collect();
        }
    }

    debug!(
        "decoded sheet '{}': {} cells, {} merge ranges",
        sheet_name,
        sheet.cells.len(),
        sheet.merges.len()
    );
    Ok(sheet)
}

fn convert(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateValue(naive),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_with_a_workbook_error() {
        let result = decode_workbook(b"definitely not a spreadsheet");
        assert!(matches!(result, Err(PipelineError::Workbook(_))));
    }

    #[test]
    fn numeric_and_boolean_cells_convert() {
        assert_eq!(convert(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(convert(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(convert(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(convert(&Data::Empty), CellValue::Empty);
    }
}
