// Utility helpers for parsing and number presentation.
//
// This module centralizes all the "dirty" CSV/number handling so the rest of
// the code can assume clean, typed values, plus the Brazilian-format output
// helpers used by the cards and chart labels.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about the
/// Brazilian formatting used by the dataset (comma as decimal separator,
/// period as thousands separator).
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - `"1.234,56"` parses as `1234.56`; plain `"1234.56"` still works.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_br(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let normalized = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else {
        s.to_string()
    };
    normalized.parse::<f64>().ok()
}

pub fn parse_u32_safe(s: Option<&str>) -> Option<u32> {
    // `?` propagates `None` early if the option is missing.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<u32>().ok()
}

pub fn mean(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Format a floating-point value in the Brazilian convention: period for
/// thousands, comma for decimals (`1234.5` -> `"1.234,50"`).
///
/// Deliberately independent of the host locale: the integer part is grouped
/// with `num-format`'s fixed English locale and the separators are swapped
/// afterwards, so the output is identical on every machine.
pub fn format_decimal_br(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    // `1,234,567` under Locale::en, then commas become the BR periods.
    let mut res = int_val.to_formatted_string(&Locale::en).replace(',', ".");
    if decimals > 0 {
        res.push(',');
        res.push_str(frac_part.unwrap_or(""));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Currency presentation used by the metric cards and chart labels:
/// `1234.5` -> `"R$ 1.234,50"`.
pub fn format_brl(n: f64) -> String {
    format!("R$ {}", format_decimal_br(n, 2))
}

pub fn format_int_br(n: i64) -> String {
    // Counts use the same separator swap (e.g., `10.692` listings).
    n.to_formatted_string(&Locale::en).replace(',', ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_brazilian_decimals() {
        assert_eq!(parse_f64_br(Some("1.234,56")), Some(1234.56));
        assert_eq!(parse_f64_br(Some("470")), Some(470.0));
        assert_eq!(parse_f64_br(Some(" 12,5 ")), Some(12.5));
        assert_eq!(parse_f64_br(Some("1234.56")), Some(1234.56));
    }

    #[test]
    fn rejects_text_and_empty() {
        assert_eq!(parse_f64_br(Some("Sem info")), None);
        assert_eq!(parse_f64_br(Some("")), None);
        assert_eq!(parse_f64_br(Some("   ")), None);
        assert_eq!(parse_f64_br(None), None);
    }

    #[test]
    fn formats_currency() {
        assert_eq!(format_brl(1234.5), "R$ 1.234,50");
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(1_234_567.891), "R$ 1.234.567,89");
    }

    #[test]
    fn formats_plain_decimals_and_counts() {
        assert_eq!(format_decimal_br(73.12, 2), "73,12");
        assert_eq!(format_decimal_br(-1500.0, 2), "-1.500,00");
        assert_eq!(format_int_br(10692), "10.692");
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
    }
}
