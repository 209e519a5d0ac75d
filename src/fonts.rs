//! Metrics and encoding for the two built-in faces every page uses:
//! Helvetica and Helvetica-Bold, WinAnsi-encoded Type1 standard fonts.

/// AFM advance widths (1/1000 em) for WinAnsi codes 32..=126, Helvetica.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, // 'A'..'P'
    778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'Q'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, // 'a'..'p'
    556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'q'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Same range for Helvetica-Bold.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667,
    778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611,
    611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Helvetica average width, used for codes outside the exact table. Keeps
/// wrapping conservative for accented text instead of overflowing columns.
const DEFAULT_WIDTH: u16 = 556;

fn glyph_width(c: char, bold: bool) -> u16 {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        let i = (code - 0x20) as usize;
        if bold {
            HELVETICA_BOLD_WIDTHS[i]
        } else {
            HELVETICA_WIDTHS[i]
        }
    } else {
        DEFAULT_WIDTH
    }
}

/// Advance width of `text` at `size` points.
pub fn text_width(text: &str, size: f64, bold: bool) -> f64 {
    let units: u32 = text.chars().map(|c| glyph_width(c, bold) as u32).sum();
    units as f64 / 1000.0 * size
}

/// Encode as WinAnsi bytes. Code points without a WinAnsi slot become '?'.
pub fn to_winansi(text: &str) -> Vec<u8> {
    text.chars().map(winansi_byte).collect()
}

fn winansi_byte(c: char) -> u8 {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) || (0xA0..=0xFF).contains(&code) {
        return code as u8;
    }
    // The 0x80..0x9F window WinAnsi repurposes for typographic characters.
    match c {
        '\u{20AC}' => 0x80, // euro
        '\u{201A}' => 0x82,
        '\u{192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85, // ellipsis
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{2C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{152}' => 0x8C,
        '\u{17D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95, // bullet
        '\u{2013}' => 0x96, // en dash
        '\u{2014}' => 0x97, // em dash
        '\u{2DC}' => 0x98,
        '\u{2122}' => 0x99, // trademark
        '\u{161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{153}' => 0x9C,
        '\u{17E}' => 0x9E,
        '\u{178}' => 0x9F,
        _ => b'?',
    }
}
