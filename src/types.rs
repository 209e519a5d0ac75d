use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Raw value of one sheet cell. Resolved to a string exactly once, at grid
/// reconstruction time; every later stage sees only strings.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    DateValue(NaiveDateTime),
    Bool(bool),
}

impl CellValue {
    /// Stringification rule per variant. Whole numbers print without a
    /// trailing ".0"; midnight timestamps print as a bare date.
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::DateValue(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            CellValue::Bool(b) => {
                if *b {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }
        }
    }
}

/// Whole numbers print as integers; everything else uses the shortest float form.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One sheet position: raw value plus the optional pre-formatted display
/// string. A non-empty display string is authoritative for output.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub display: Option<String>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Cell { value, display: None }
    }

    /// Display string when present and non-empty, else the stringified raw value.
    pub fn resolve(&self) -> String {
        match &self.display {
            Some(d) if !d.is_empty() => d.clone(),
            _ => self.value.to_display_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.resolve().is_empty()
    }
}

/// Inclusive rectangular block of cells logically holding the top-left
/// cell's value. Ranges never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl MergeRange {
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    /// Top-left cell, whose value every cell in the range shows.
    pub fn anchor(&self) -> (u32, u32) {
        (self.start_row, self.start_col)
    }
}

/// One worksheet as a sparse cell map plus its merge ranges. Keyed by
/// (row, col); BTreeMap keeps iteration order deterministic.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub cells: BTreeMap<(u32, u32), Cell>,
    pub merges: Vec<MergeRange>,
}

/// One normalized data row, keyed by inferred header name.
pub type Record = HashMap<String, String>;

/// Sentinel option the mapping UI shows when grouping is enabled but no
/// group column has been picked yet.
pub const NO_GROUPING: &str = "-- No Grouping --";

/// User assignment of semantic roles to header names. Persisted by an
/// external key-value store; the core only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mapping {
    pub is_grouping_enabled: bool,
    pub customer: String,
    pub email: String,
    pub invoice_no: String,
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub group_by: String,
}

/// Rendering settings: issuer identity, currency/locale, watermark flag.
/// The issue date is part of the settings so rendering the same inputs
/// twice produces identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub company_name: String,
    pub company_email: String,
    pub company_address: String,
    pub company_tax_id: String,
    pub currency: String,
    pub locale: String,
    pub watermark: bool,
    pub issue_date: NaiveDate,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            company_name: "Your Company".to_string(),
            company_email: "you@example.com".to_string(),
            company_address: "123 Your Street, City".to_string(),
            company_tax_id: String::new(),
            currency: "USD".to_string(),
            locale: "en-US".to_string(),
            watermark: false,
            issue_date: chrono::Local::now().date_naive(),
        }
    }
}

/// One billing line. `line_total` is always `quantity * unit_price`; both
/// default to 0 when the source cell fails numeric parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub line_total: f64,
}

/// One billing document. `index` is the invoice's position in the computed
/// batch and is the sole identifier the selection/export UI uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub customer: String,
    pub email: String,
    pub group_label: String,
    pub invoice_number: String,
    pub lines: Vec<InvoiceLine>,
    pub validation_errors: Vec<String>,
    #[serde(rename = "_index")]
    pub index: usize,
}

impl Invoice {
    /// Sum of all line totals.
    pub fn grand_total(&self) -> f64 {
        self.lines.iter().map(|l| l.line_total).sum()
    }
}
