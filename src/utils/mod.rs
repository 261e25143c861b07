//! Utility functions and helpers.

pub mod date;
pub mod url;

pub use self::date::parse_date;
pub use self::url::{UrlParts, split_url};

use crate::models::Cell;

/// Read a non-negative view count from a cell.
///
/// Numbers are truncated; text contributes its leading integer (thousands
/// separators ignored). Anything else, and negative counts, read as `0`.
pub fn parse_count(cell: &Cell) -> u64 {
    match cell {
        Cell::Number(n) if n.is_finite() && *n > 0.0 => n.trunc() as u64,
        Cell::Text(s) => parse_leading_integer(s),
        _ => 0,
    }
}

fn parse_leading_integer(text: &str) -> u64 {
    let text = text.trim_start();
    if text.starts_with('-') {
        return 0;
    }
    let digits: String = text
        .trim_start_matches('+')
        .chars()
        .filter(|c| *c != ',')
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}
