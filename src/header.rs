//! Header inference: banner-row skipping, header-depth probing, and unique
//! flat column names.

use crate::grid::Grid;

/// Rows probed while skipping leading banner/title rows.
const BANNER_PROBE_ROWS: usize = 10;
/// Deepest header block we will accept.
const MAX_HEADER_DEPTH: usize = 3;
/// Rows below the header block inspected when fixing the table width, so
/// inference stays bounded regardless of sheet length.
const WIDTH_LOOKAHEAD_ROWS: usize = 200;
/// A jump of at least this much in the numeric-or-date-like ratio marks the
/// first data row.
const DATA_RATIO_JUMP: f64 = 0.2;

/// Result of header inference over a trimmed grid.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderInfo {
    /// Unique non-empty column names, one per grid column.
    pub columns: Vec<String>,
    /// Number of header rows (1..=3) below any banner rows.
    pub depth: usize,
    /// Grid index of the first data row.
    pub data_start: usize,
    /// Uniform table width.
    pub max_cols: usize,
}

/// Infer the header block of a trimmed, rectangular grid.
pub fn infer_headers(grid: &Grid) -> HeaderInfo {
    let start = skip_banner_rows(grid);
    let available = grid.len() - start;
    let depth = probe_header_depth(grid, start).clamp(1, MAX_HEADER_DEPTH.min(available.max(1)));

    let max_cols = grid
        .iter()
        .skip(start)
        .take(depth + WIDTH_LOOKAHEAD_ROWS)
        .map(|r| r.len())
        .max()
        .unwrap_or(0);

    let mut columns = Vec::with_capacity(max_cols);
    for col in 0..max_cols {
        // Deepest header row first: in multi-row headers the bottom row
        // carries the most specific label.
        let mut label = String::new();
        for depth_row in (start..start + depth).rev() {
            if let Some(text) = grid.get(depth_row).and_then(|r| r.get(col)) {
                let collapsed = collapse_whitespace(text);
                if !collapsed.is_empty() {
                    label = collapsed;
                    break;
                }
            }
        }
        if label.is_empty() {
            label = format!("Column_{}", col + 1);
        }
        columns.push(label);
    }

    HeaderInfo {
        columns: dedupe_labels(columns),
        depth,
        data_start: start + depth,
        max_cols,
    }
}

/// Leading rows where every non-empty cell holds one identical value are
/// banner/title rows, not headers. At most `BANNER_PROBE_ROWS` are skipped,
/// and never the whole grid.
fn skip_banner_rows(grid: &Grid) -> usize {
    let mut start = 0;
    while start < grid.len().saturating_sub(1)
        && start < BANNER_PROBE_ROWS
        && is_banner_row(&grid[start])
    {
        start += 1;
    }
    start
}

fn is_banner_row(row: &[String]) -> bool {
    let mut seen: Option<&str> = None;
    for cell in row {
        let text = cell.trim();
        if text.is_empty() {
            continue;
        }
        match seen {
            None => seen = Some(text),
            Some(first) if first == text => {}
            Some(_) => return false,
        }
    }
    seen.is_some()
}

/// Header depth is the smallest k >= 1 whose row start+k looks markedly more
/// numeric than the row above it; that row is already data. Defaults to 1.
fn probe_header_depth(grid: &Grid, start: usize) -> usize {
    for k in 1..=MAX_HEADER_DEPTH {
        let Some(next) = grid.get(start + k) else { break };
        let Some(prev) = grid.get(start + k - 1) else { break };
        if numeric_ratio(next) - numeric_ratio(prev) >= DATA_RATIO_JUMP {
            return k;
        }
    }
    1
}

/// Share of non-empty cells that look numeric or date-like. Header rows are
/// predominantly label text; data rows trend numeric.
fn numeric_ratio(row: &[String]) -> f64 {
    let mut non_empty = 0usize;
    let mut numeric = 0usize;
    for cell in row {
        let text = cell.trim();
        if text.is_empty() {
            continue;
        }
        non_empty += 1;
        if is_numeric_or_date_like(text) {
            numeric += 1;
        }
    }
    if non_empty == 0 {
        0.0
    } else {
        numeric as f64 / non_empty as f64
    }
}

fn is_numeric_or_date_like(value: &str) -> bool {
    let v = value.trim();
    if v.parse::<f64>().is_ok() {
        return true;
    }
    if v.replace(',', "").replace(' ', "").parse::<f64>().is_ok() {
        return true;
    }
    if (v.contains('/') || v.contains('-') || v.contains(':'))
        && v.chars().filter(|c| c.is_ascii_digit()).count() >= 4
    {
        return true;
    }
    false
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Append `_2`, `_3`, ... to repeated labels, first occurrence unsuffixed.
fn dedupe_labels(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        if !out.contains(&label) {
            out.push(label);
            continue;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", label, n);
            if !out.contains(&candidate) {
                out.push(candidate);
                break;
            }
            n += 1;
        }
    }
    out
}
