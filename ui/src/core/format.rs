//! Formatting helpers for chart labels and counts.

use std::fmt::Display;

/// Render a `YYYYMMDD` value (number or string) as `YYYY-MM-DD`.
///
/// No validation happens here: short or malformed input yields empty or
/// partial segments instead of an error, e.g. `"2023"` becomes `"2023--"`.
pub fn format_date(value: impl Display) -> String {
    let raw = value.to_string();
    let chars: Vec<char> = raw.chars().collect();
    let segment = |start: usize, end: usize| -> String {
        let end = end.min(chars.len());
        if start >= end {
            String::new()
        } else {
            chars[start..end].iter().collect()
        }
    };

    format!("{}-{}-{}", segment(0, 4), segment(4, 6), segment(6, 8))
}

/// Shorten `label` to at most `max_len` characters, marking the cut with `...`.
///
/// Callers must pass `max_len >= 3`; the ellipsis alone needs three characters.
pub fn truncate_label(label: &str, max_len: usize) -> String {
    debug_assert!(max_len >= 3, "truncate_label needs room for the ellipsis");

    if label.chars().count() > max_len {
        let kept: String = label.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        label.to_string()
    }
}

/// Thousands-separated count, e.g. `12345` -> `12,345`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_dates_match() {
        assert_eq!(format_date(20230615), "2023-06-15");
        assert_eq!(format_date("20230615"), "2023-06-15");
    }

    #[test]
    fn short_dates_degrade_without_panicking() {
        assert_eq!(format_date("2023"), "2023--");
        assert_eq!(format_date(""), "--");
        assert_eq!(format_date("202306"), "2023-06-");
    }

    #[test]
    fn labels_within_limit_are_untouched() {
        for label in ["", "NAUSEA", "HEADACHE12"] {
            assert_eq!(truncate_label(label, 10), label);
        }
    }

    #[test]
    fn long_labels_are_cut_to_exact_width() {
        let out = truncate_label("DRUG INEFFECTIVE", 10);
        assert_eq!(out, "DRUG IN...");
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let out = truncate_label("ÉRUPTION CUTANÉE", 10);
        assert_eq!(out.chars().count(), 10);
    }

    #[test]
    fn counts_get_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }
}
