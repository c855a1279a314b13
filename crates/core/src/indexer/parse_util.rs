//! Lenient field parsers for scraped table cells.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static SIZE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\d][\d.,\s]*)\s*([a-zA-Z]*)").unwrap());

/// Parse an integer out of a cell, ignoring everything but digits.
pub fn coerce_int(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Parse a human-readable size such as `1.37 GB` or `700,5MiB` into bytes.
///
/// Units are binary (1 KB = 1024 bytes). When both `.` and `,` appear the
/// last one is the decimal separator; a lone `,` is treated as decimal.
pub fn parse_size(text: &str) -> Option<u64> {
    let captures = SIZE_REGEX.captures(text)?;
    let number = normalize_number(captures.get(1)?.as_str())?;
    let unit = captures
        .get(2)
        .map(|m| m.as_str().to_ascii_lowercase().replace('i', ""))
        .unwrap_or_default();

    let multiplier: f64 = match unit.as_str() {
        "kb" | "k" => 1024.0,
        "mb" | "m" => 1024.0_f64.powi(2),
        "gb" | "g" => 1024.0_f64.powi(3),
        "tb" | "t" => 1024.0_f64.powi(4),
        "pb" | "p" => 1024.0_f64.powi(5),
        _ => 1.0,
    };

    Some((number * multiplier).round() as u64)
}

fn normalize_number(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized = match (compact.rfind('.'), compact.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (None, Some(_)) => compact.replace(',', "."),
        _ => compact,
    };
    normalized.parse().ok()
}

/// Parse an IMDb id (`tt0133093` or `0133093`) into its numeric form.
pub fn parse_imdb_id(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("tt")
        .or_else(|| trimmed.strip_prefix("TT"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_int() {
        assert_eq!(coerce_int("42"), Some(42));
        assert_eq!(coerce_int(" 1,234 "), Some(1234));
        assert_eq!(coerce_int("\n 7\n"), Some(7));
        assert_eq!(coerce_int(""), None);
        assert_eq!(coerce_int("n/a"), None);
    }

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("512 B"), Some(512));
        assert_eq!(parse_size("1 KB"), Some(1024));
        assert_eq!(parse_size("1.5 MB"), Some(1_572_864));
        assert_eq!(parse_size("1.37GB"), Some(1_471_026_299));
        assert_eq!(parse_size("2 TiB"), Some(2_199_023_255_552));
        assert_eq!(parse_size("100"), Some(100));
    }

    #[test]
    fn test_parse_size_separators() {
        assert_eq!(parse_size("700,5 MB"), Some(734_527_488));
        assert_eq!(parse_size("1,024.5 KB"), Some(1_049_088));
        assert_eq!(parse_size("1.024,5 KB"), Some(1_049_088));
    }

    #[test]
    fn test_parse_size_garbage() {
        assert_eq!(parse_size(""), None);
        assert_eq!(parse_size("unknown"), None);
    }

    #[test]
    fn test_parse_imdb_id() {
        assert_eq!(parse_imdb_id("tt0133093"), Some(133093));
        assert_eq!(parse_imdb_id("0133093"), Some(133093));
        assert_eq!(parse_imdb_id("tt"), None);
        assert_eq!(parse_imdb_id("tt0000000"), None);
        assert_eq!(parse_imdb_id("title"), None);
    }
}
