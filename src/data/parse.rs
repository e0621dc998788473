//! Extraction of `tag:value` readings from cleaned lines.
//!
//! A line is free text containing zero or more comma-separated pairs such as
//! `temp:21.5, hum:60`. Segments that do not have the `identifier:number`
//! shape are dropped, never an error.

use std::collections::BTreeMap;

/// The readings parsed from one line, plus the segments that did not match.
///
/// `dropped` exists so callers (and tests) can observe the drop-on-mismatch
/// policy directly instead of relying on log output.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Extraction {
    /// Parsed readings, duplicate tags resolved to the last occurrence.
    pub readings: BTreeMap<String, f64>,
    /// Trimmed non-empty segments that failed to parse.
    pub dropped: Vec<String>,
}

/// Split `line` on commas and parse each segment as `tag:value`.
pub fn extract(line: &str) -> Extraction {
    let mut extraction = Extraction::default();
    for segment in line.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match parse_pair(segment) {
            Some((tag, value)) => {
                extraction.readings.insert(tag.to_string(), value);
            }
            None => extraction.dropped.push(segment.to_string()),
        }
    }
    extraction
}

/// Parse one trimmed segment of the form `identifier ':' numeric`.
fn parse_pair(segment: &str) -> Option<(&str, f64)> {
    let (tag, value) = segment.split_once(':')?;
    if !is_identifier(tag) || !is_numeric(value) {
        return None;
    }
    let value: f64 = value.parse().ok()?;
    Some((tag, value))
}

/// Variable-name rules: letter or underscore start, alphanumeric or
/// underscore continuation.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Optional leading minus, then digits with at most one decimal point.
/// At least one digit is required, which keeps NaN out of the store.
fn is_numeric(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|c| *c == '.').count() <= 1
        && digits.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_valid_pairs_and_drops_malformed() {
        let extraction = extract("temp:21.5, hum:60, bad_pair, x:-3.2");
        assert_eq!(extraction.readings.len(), 3);
        assert_eq!(extraction.readings["temp"], 21.5);
        assert_eq!(extraction.readings["hum"], 60.0);
        assert_eq!(extraction.readings["x"], -3.2);
        assert_eq!(extraction.dropped, vec!["bad_pair"]);
    }

    #[test]
    fn test_free_text_yields_no_readings() {
        let extraction = extract("booting sensor firmware v1.2");
        assert!(extraction.readings.is_empty());
        assert!(!extraction.dropped.is_empty());
    }

    #[test]
    fn test_duplicate_tag_last_occurrence_wins() {
        let extraction = extract("temp:1, temp:2.5");
        assert_eq!(extraction.readings.len(), 1);
        assert_eq!(extraction.readings["temp"], 2.5);
    }

    #[test]
    fn test_identifier_rules() {
        assert!(extract("_t1:1").readings.contains_key("_t1"));
        assert!(extract("1temp:1").readings.is_empty());
        assert!(extract("te mp:1").readings.is_empty());
        assert!(extract(":1").readings.is_empty());
    }

    #[test]
    fn test_numeric_rules() {
        assert_eq!(extract("a:1.").readings["a"], 1.0);
        assert_eq!(extract("a:.5").readings["a"], 0.5);
        assert_eq!(extract("a:-0.25").readings["a"], -0.25);
        // Digit-less and multi-dot tokens are dropped
        assert!(extract("a:-").readings.is_empty());
        assert!(extract("a:.").readings.is_empty());
        assert!(extract("a:1.2.3").readings.is_empty());
        assert!(extract("a:1e3").readings.is_empty());
    }

    #[test]
    fn test_spaces_around_colon_do_not_match() {
        assert!(extract("temp: 21.5").readings.is_empty());
        assert!(extract("temp :21.5").readings.is_empty());
    }

    #[test]
    fn test_empty_segments_are_ignored() {
        let extraction = extract("a:1,,  ,b:2");
        assert_eq!(extraction.readings.len(), 2);
        assert!(extraction.dropped.is_empty());
    }
}
