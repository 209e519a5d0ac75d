//! Grid reconstruction: sparse cell map + merge ranges -> dense rectangular
//! string grid with empty borders trimmed.

use crate::error::PipelineError;
use crate::types::Sheet;

/// Dense row-major value grid. Invariant: every row has the same length.
pub type Grid = Vec<Vec<String>>;

/// Materialize the sheet into a dense grid, fill merged regions with their
/// anchor value, then trim all-empty border rows and columns.
pub fn reconstruct_grid(sheet: &Sheet) -> Result<Grid, PipelineError> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    let mut extend = |row: u32, col: u32, b: &mut Option<(u32, u32, u32, u32)>| {
        *b = Some(match *b {
            None => (row, col, row, col),
            Some((r0, c0, r1, c1)) => (r0.min(row), c0.min(col), r1.max(row), c1.max(col)),
        });
    };

    for (&(row, col), cell) in &sheet.cells {
        if !cell.is_empty() {
            extend(row, col, &mut bounds);
        }
    }
    // Bounds are the union of the non-empty-cell bbox and the merge bbox,
    // but a sheet with no non-empty cells is empty no matter its merges.
    if bounds.is_none() {
        return Err(PipelineError::EmptySheet);
    }
    for m in &sheet.merges {
        extend(m.start_row, m.start_col, &mut bounds);
        extend(m.end_row, m.end_col, &mut bounds);
    }
    let Some((r0, c0, r1, c1)) = bounds else {
        return Err(PipelineError::EmptySheet);
    };

    let rows = (r1 - r0 + 1) as usize;
    let cols = (c1 - c0 + 1) as usize;
    let mut grid = vec![vec![String::new(); cols]; rows];
    for row in r0..=r1 {
        for col in c0..=c1 {
            let mut value = sheet
                .cells
                .get(&(row, col))
                .map(|c| c.resolve())
                .unwrap_or_default();
            if value.is_empty() {
                // Merge fill: every cell of a merged region shows the
                // anchor (top-left) cell's value.
                if let Some(m) = sheet.merges.iter().find(|m| m.contains(row, col)) {
                    value = sheet
                        .cells
                        .get(&m.anchor())
                        .map(|c| c.resolve())
                        .unwrap_or_default();
                }
            }
            grid[(row - r0) as usize][(col - c0) as usize] = value;
        }
    }

    let grid = trim_grid(grid);
    if grid.is_empty() {
        return Err(PipelineError::EmptySheet);
    }
    Ok(grid)
}

/// Drop leading/trailing all-empty rows, then leading/trailing all-empty
/// columns. Ragged rows are right-padded to uniform width first. Idempotent.
pub fn trim_grid(mut grid: Grid) -> Grid {
    let width = grid.iter().map(|r| r.len()).max().unwrap_or(0);
    for row in &mut grid {
        row.resize(width, String::new());
    }

    while grid.first().map(|r| row_is_empty(r)).unwrap_or(false) {
        grid.remove(0);
    }
    while grid.last().map(|r| row_is_empty(r)).unwrap_or(false) {
        grid.pop();
    }
    if grid.is_empty() {
        return grid;
    }

    let width = grid[0].len();
    let mut lead = 0;
    while lead < width && grid.iter().all(|r| r[lead].is_empty()) {
        lead += 1;
    }
    let mut trail = width;
    while trail > lead && grid.iter().all(|r| r[trail - 1].is_empty()) {
        trail -= 1;
    }
    if lead > 0 || trail < width {
        grid = grid
            .into_iter()
            .map(|r| r[lead..trail].to_vec())
            .collect();
    }
    grid
}

fn row_is_empty(row: &[String]) -> bool {
    row.iter().all(|c| c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, CellValue, MergeRange, Sheet};

    fn sheet_from(rows: &[&[&str]]) -> Sheet {
        let mut sheet = Sheet::default();
        for (r, row) in rows.iter().enumerate() {
            for (c, text) in row.iter().enumerate() {
                if !text.is_empty() {
                    sheet.cells.insert(
                        (r as u32, c as u32),
                        Cell::new(CellValue::Text(text.to_string())),
                    );
                }
            }
        }
        sheet
    }

    #[test]
    fn trims_empty_borders_on_all_sides() {
        let sheet = sheet_from(&[
            &["", "", "", ""],
            &["", "a", "b", ""],
            &["", "c", "d", ""],
            &["", "", "", ""],
        ]);
        let grid = reconstruct_grid(&sheet).unwrap();
        assert_eq!(grid, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn merge_fill_resolves_every_cell_to_the_anchor() {
        let mut sheet = sheet_from(&[&["Title"], &["x"]]);
        sheet.merges.push(MergeRange {
            start_row: 0,
            start_col: 0,
            end_row: 0,
            end_col: 2,
        });
        let grid = reconstruct_grid(&sheet).unwrap();
        assert_eq!(grid[0], vec!["Title", "Title", "Title"]);
        assert_eq!(grid[1], vec!["x", "", ""]);
    }

    #[test]
    fn merge_fill_is_idempotent() {
        let mut sheet = sheet_from(&[&["A", "", ""], &["1", "2", "3"]]);
        sheet.merges.push(MergeRange {
            start_row: 0,
            start_col: 0,
            end_row: 0,
            end_col: 2,
        });
        let once = reconstruct_grid(&sheet).unwrap();
        // Re-running fill-down on an already-filled grid changes nothing:
        // seed a sheet from the filled grid and reconstruct again.
        let mut refilled = Sheet::default();
        for (r, row) in once.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                if !v.is_empty() {
                    refilled
                        .cells
                        .insert((r as u32, c as u32), Cell::new(CellValue::Text(v.clone())));
                }
            }
        }
        refilled.merges = sheet.merges.clone();
        assert_eq!(reconstruct_grid(&refilled).unwrap(), once);
    }

    #[test]
    fn trim_is_idempotent() {
        let grid = vec![
            vec!["".to_string(), "".to_string()],
            vec!["a".to_string(), "".to_string()],
        ];
        let trimmed = trim_grid(grid);
        assert_eq!(trim_grid(trimmed.clone()), trimmed);
    }

    #[test]
    fn ragged_rows_are_right_padded() {
        let grid = trim_grid(vec![
            vec!["a".to_string()],
            vec!["b".to_string(), "c".to_string()],
        ]);
        assert_eq!(grid, vec![vec!["a", ""], vec!["b", "c"]]);
    }

    #[test]
    fn fully_empty_sheet_fails() {
        let sheet = Sheet::default();
        assert!(matches!(
            reconstruct_grid(&sheet),
            Err(PipelineError::EmptySheet)
        ));

        let mut blank = Sheet::default();
        blank
            .cells
            .insert((0, 0), Cell::new(CellValue::Text(String::new())));
        blank.cells.insert((1, 1), Cell::new(CellValue::Empty));
        assert!(matches!(
            reconstruct_grid(&blank),
            Err(PipelineError::EmptySheet)
        ));
    }
}
