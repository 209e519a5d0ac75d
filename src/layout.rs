//! Document layout: one invoice -> fixed-size pages of draw instructions.
//!
//! Layout is pure data; `pdf` replays the instructions into content streams.
//! Coordinates are PDF points with the origin at the bottom-left corner, so
//! the vertical cursor moves downward by decreasing `y`.

use crate::fonts::text_width;
use crate::money::format_money;
use crate::types::{format_number, Invoice, Settings};

pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;
pub const MARGIN_TOP: f64 = 40.0;
pub const MARGIN_RIGHT: f64 = 40.0;
pub const MARGIN_BOTTOM: f64 = 50.0;
pub const MARGIN_LEFT: f64 = 40.0;

const LINE_HEIGHT: f64 = 12.0;
const CELL_PAD: f64 = 10.0;
const ROW_PAD_TOP: f64 = 8.0;
const ROW_PAD_BOTTOM: f64 = 8.0;
/// Minimum gap between the metadata block and the top of the table.
const META_TABLE_GAP: f64 = 24.0;

/// Column shares of the usable width: description, qty, unit price, total.
const COL_DESC: f64 = 0.60;
const COL_QTY: f64 = 0.10;
const COL_UNIT: f64 = 0.15;
const COL_TOTAL: f64 = 0.15;

pub type Rgb = (f64, f64, f64);

const BLACK: Rgb = (0.0, 0.0, 0.0);
const GREY: Rgb = (0.35, 0.35, 0.35);
const LIGHT_GREY: Rgb = (0.9, 0.9, 0.9);
const BAND: Rgb = (0.95, 0.95, 0.95);

/// One draw instruction. Pages are just ordered instruction lists.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f64,
        y: f64,
        size: f64,
        bold: bool,
        color: Rgb,
        /// Counter-clockwise rotation in degrees; 0 for normal text.
        angle: f64,
        /// Fill opacity; 1.0 for normal text.
        opacity: f64,
        text: String,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Rgb,
    },
}

/// One fixed-size rendered page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutPage {
    pub ops: Vec<DrawOp>,
}

/// Lay the invoice out as one or more A4 pages.
pub fn layout_invoice(invoice: &Invoice, settings: &Settings) -> Vec<LayoutPage> {
    let mut composer = Composer::new(settings);
    composer.compose(invoice);
    composer.finish(settings.watermark)
}

struct Composer<'a> {
    settings: &'a Settings,
    pages: Vec<LayoutPage>,
    ops: Vec<DrawOp>,
    y: f64,
}

impl<'a> Composer<'a> {
    fn new(settings: &'a Settings) -> Self {
        Composer {
            settings,
            pages: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN_TOP,
        }
    }

    fn usable_width(&self) -> f64 {
        PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn money(&self, amount: f64) -> String {
        format_money(amount, &self.settings.currency, &self.settings.locale)
    }

    fn text(&mut self, text: &str, x: f64, y: f64, size: f64, bold: bool, color: Rgb) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            size,
            bold,
            color,
            angle: 0.0,
            opacity: 1.0,
            text: text.to_string(),
        });
    }

    /// Right-aligned text: shift left by the measured advance width.
    fn text_right(&mut self, text: &str, x_right: f64, y: f64, size: f64, bold: bool, color: Rgb) {
        let x = x_right - text_width(text, size, bold);
        self.text(text, x, y, size, bold, color);
    }

    /// Shaded band with the four column titles, drawn around the current cursor.
    fn table_header(&mut self) {
        let tw = self.usable_width();
        let (x1, x2, x3, x4) = column_edges(tw);
        let y = self.y;
        self.ops.push(DrawOp::Rect {
            x: MARGIN_LEFT,
            y: y - 4.0,
            width: tw,
            height: 20.0,
            color: BAND,
        });
        self.text("Description", x1 + CELL_PAD, y, 10.0, true, GREY);
        self.text_right("Qty", x2 + tw * COL_QTY - CELL_PAD, y, 10.0, true, GREY);
        self.text_right("Unit Price", x3 + tw * COL_UNIT - CELL_PAD, y, 10.0, true, GREY);
        self.text_right("Total", x4 + tw * COL_TOTAL - CELL_PAD, y, 10.0, true, GREY);
    }

    /// Per-row pagination check: when the needed height does not fit above
    /// the bottom margin, start a new page and redraw the table header.
    fn ensure(&mut self, need: f64, include_header: bool) {
        let extra = if include_header { 40.0 } else { 0.0 };
        if self.y - (need + extra) < MARGIN_BOTTOM {
            let ops = std::mem::take(&mut self.ops);
            self.pages.push(LayoutPage { ops });
            self.y = PAGE_HEIGHT - MARGIN_TOP;
            self.table_header();
            self.y -= 25.0;
        }
    }

    fn compose(&mut self, invoice: &Invoice) {
        let s = self.settings;
        let x_right = PAGE_WIDTH - MARGIN_RIGHT;

        self.text("INVOICE", MARGIN_LEFT, self.y, 18.0, true, BLACK);
        self.text_right(&s.company_name, x_right, self.y, 11.0, true, BLACK);
        self.y -= 16.0;

        let mut issuer_parts = Vec::new();
        if !s.company_address.is_empty() {
            issuer_parts.push(s.company_address.clone());
        }
        if !s.company_tax_id.is_empty() {
            issuer_parts.push(format!("TAX: {}", s.company_tax_id));
        }
        let issuer_line = issuer_parts.join(" \u{2022} ");
        self.text_right(&issuer_line, x_right, self.y, 9.0, false, GREY);
        self.y -= 28.0;

        self.text("Billed To", MARGIN_LEFT, self.y, 9.0, false, GREY);
        self.text(&invoice.customer, MARGIN_LEFT, self.y - 14.0, 11.0, true, BLACK);
        let meta_y = self.y;
        self.y -= 32.0;
        if !invoice.email.is_empty() {
            self.text(&invoice.email, MARGIN_LEFT, self.y, 10.0, false, BLACK);
            self.y -= 14.0;
        }
        if !invoice.group_label.is_empty() {
            let label = format!("Project/Group: {}", invoice.group_label);
            self.text(&label, MARGIN_LEFT, self.y, 10.0, false, BLACK);
            self.y -= 14.0;
        }

        self.text_right("Invoice Number", x_right, meta_y, 9.0, false, GREY);
        self.text_right(&invoice.invoice_number, x_right, meta_y - 14.0, 11.0, true, BLACK);
        self.text_right("Date of Issue", x_right, meta_y - 32.0, 9.0, false, GREY);
        let issued = s.issue_date.format("%Y-%m-%d").to_string();
        self.text_right(&issued, x_right, meta_y - 46.0, 11.0, true, BLACK);

        // The table must never ride up into the metadata block, however few
        // lines the "Billed To" side drew.
        let meta_bottom = meta_y - 46.0 - 12.0;
        self.y = self.y.min(meta_bottom - META_TABLE_GAP);
        self.ensure(0.0, false);

        self.table_header();

        let tw = self.usable_width();
        let (x1, x2, x3, x4) = column_edges(tw);
        let w_desc = tw * COL_DESC;
        let mut sum = 0.0;
        for item in &invoice.lines {
            let desc_lines = wrap_text(&item.description, w_desc - CELL_PAD * 2.0, 10.0);
            let row_height = desc_lines.len() as f64 * LINE_HEIGHT + ROW_PAD_TOP + ROW_PAD_BOTTOM;
            self.ensure(row_height, true);

            let top = self.y;
            let content_y = top - ROW_PAD_TOP - (LINE_HEIGHT - 2.0);
            let qty = format_number(item.quantity);
            let unit = self.money(item.unit_price);
            let total = self.money(item.line_total);
            self.text_right(&qty, x2 + tw * COL_QTY - CELL_PAD, content_y, 10.0, false, BLACK);
            self.text_right(&unit, x3 + tw * COL_UNIT - CELL_PAD, content_y, 10.0, false, BLACK);
            self.text_right(&total, x4 + tw * COL_TOTAL - CELL_PAD, content_y, 10.0, true, BLACK);

            let mut desc_y = content_y;
            for line in &desc_lines {
                self.text(line, x1 + CELL_PAD, desc_y, 10.0, false, BLACK);
                desc_y -= LINE_HEIGHT;
            }

            // Advance first, then place the separator from the new cursor so
            // it sits exactly at the row's bottom whatever the wrapped height.
            self.y = top - row_height;
            self.ops.push(DrawOp::Line {
                x1: MARGIN_LEFT,
                y1: self.y,
                x2: PAGE_WIDTH - MARGIN_RIGHT,
                y2: self.y,
                width: 0.5,
                color: LIGHT_GREY,
            });

            sum += item.line_total;
        }

        self.y -= 20.0;
        self.ensure(28.0, false);
        let grand = self.money(sum);
        self.text_right("Grand Total", x4 - CELL_PAD, self.y, 12.0, true, BLACK);
        self.text_right(&grand, x_right, self.y, 12.0, true, BLACK);
    }

    fn finish(mut self, watermark: bool) -> Vec<LayoutPage> {
        self.pages.push(LayoutPage { ops: self.ops });
        if watermark {
            for page in &mut self.pages {
                page.ops.push(DrawOp::Text {
                    x: 120.0,
                    y: 420.0,
                    size: 70.0,
                    bold: true,
                    color: BLACK,
                    angle: -30.0,
                    opacity: 0.05,
                    text: "WATERMARK".to_string(),
                });
            }
        }
        self.pages
    }
}

/// Left edges of the four table columns.
fn column_edges(tw: f64) -> (f64, f64, f64, f64) {
    let x1 = MARGIN_LEFT;
    let x2 = x1 + tw * COL_DESC;
    let x3 = x2 + tw * COL_QTY;
    let x4 = x3 + tw * COL_UNIT;
    (x1, x2, x3, x4)
}

/// Greedy word wrap: append the next word unless it would overflow a
/// non-empty line. Always yields at least one (possibly empty) line.
pub fn wrap_text(text: &str, max_width: f64, size: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", line, word)
        };
        if text_width(&candidate, size, false) > max_width && !line.is_empty() {
            lines.push(line);
            line = word.to_string();
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
