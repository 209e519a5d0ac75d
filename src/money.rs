//! Monetary formatting: currency symbol plus locale-dependent digit
//! grouping, with a plain numeric fallback for unknown currency codes.

/// Format an amount for the given currency/locale pair. Unknown currencies
/// fall back to the plain numeric string rather than failing.
pub fn format_money(amount: f64, currency: &str, locale: &str) -> String {
    let (group, decimal) = separators(locale);
    match currency {
        "USD" => format!("${}", grouped(amount, 2, group, decimal)),
        "EUR" => format!("\u{20AC}{}", grouped(amount, 2, group, decimal)),
        "GBP" => format!("\u{A3}{}", grouped(amount, 2, group, decimal)),
        "JPY" => format!("\u{A5}{}", grouped(amount, 0, group, decimal)),
        // No WinAnsi glyph for the dong sign; the ISO code reads better
        // than a replacement character.
        "VND" => format!("{} VND", grouped(amount, 0, group, decimal)),
        _ => plain(amount),
    }
}

/// (thousands separator, decimal separator) for the locale family.
fn separators(locale: &str) -> (char, char) {
    let lang = locale.split(['-', '_']).next().unwrap_or("");
    match lang {
        "vi" | "de" | "es" | "it" | "pt" | "nl" => ('.', ','),
        "fr" => ('\u{A0}', ','),
        _ => (',', '.'),
    }
}

/// Fixed-decimal rendering with thousands grouping (27826.17 -> "27,826.17").
fn grouped(amount: f64, decimals: usize, group: char, decimal: char) -> String {
    let s = format!("{:.*}", decimals, amount);
    let (int_part, dec_part) = match s.find('.') {
        Some(dot) => (&s[..dot], &s[dot + 1..]),
        None => (s.as_str(), ""),
    };
    let (sign, digits) = if let Some(rest) = int_part.strip_prefix('-') {
        ("-", rest)
    } else {
        ("", int_part)
    };
    let mut out = String::from(sign);
    let chars: Vec<char> = digits.chars().collect();
    let len = chars.len();
    for (i, c) in chars.into_iter().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(group);
        }
        out.push(c);
    }
    if !dec_part.is_empty() {
        out.push(decimal);
        out.push_str(dec_part);
    }
    out
}

fn plain(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{:.2}", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_en_us() {
        assert_eq!(format_money(1234.5, "USD", "en-US"), "$1,234.50");
        assert_eq!(format_money(0.0, "USD", "en-US"), "$0.00");
        assert_eq!(format_money(-27826.17, "USD", "en-US"), "$-27,826.17");
    }

    #[test]
    fn eur_de_de_swaps_separators() {
        assert_eq!(format_money(1234.5, "EUR", "de-DE"), "\u{20AC}1.234,50");
    }

    #[test]
    fn vnd_uses_code_suffix_and_no_decimals() {
        assert_eq!(format_money(1234567.0, "VND", "vi-VN"), "1.234.567 VND");
    }

    #[test]
    fn unknown_currency_falls_back_to_plain_number() {
        assert_eq!(format_money(42.0, "XTS", "en-US"), "42");
        assert_eq!(format_money(42.5, "XTS", "en-US"), "42.50");
    }
}
