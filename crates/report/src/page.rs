//! Values read off the complex page.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HOUSEHOLDS: Regex =
        Regex::new(r"(\d+(?:,\d+)*)\s*세대").expect("household count pattern");
}

/// Complex number from a page path ("/complexes/12345?ms=..." → "12345").
///
/// Returns "unknown" when the path has no complex segment.
pub fn complex_no_from_path(path: &str) -> String {
    path.split_once("/complexes/")
        .map(|(_, rest)| rest.split('?').next().unwrap_or(""))
        .filter(|no| !no.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Household count from the summary text ("1,234세대" → 1234). Zero when absent.
pub fn total_households(summary_text: &str) -> u32 {
    HOUSEHOLDS
        .captures(summary_text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
        .unwrap_or(0)
}
