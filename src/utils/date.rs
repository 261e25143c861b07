// src/utils/date.rs

//! Spreadsheet date normalization.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

use crate::models::Cell;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Decode a spreadsheet date serial.
///
/// Serials count from 1900-01-01 with an offset of two days, reproducing the
/// phantom 1900-02-29 of the legacy spreadsheet date system: serial `2` is
/// 1900-01-01 and serial `44927` is 2023-01-01. Fractional days are dropped.
pub fn from_serial(value: f64) -> Option<NaiveDate> {
    if !value.is_finite() {
        return None;
    }
    let millis = (value - 2.0) * MILLIS_PER_DAY;
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)?.and_hms_opt(0, 0, 0)?;
    epoch
        .checked_add_signed(Duration::try_milliseconds(millis as i64)?)
        .map(|dt| dt.date())
}

/// Parse free-form date text.
///
/// Accepts RFC 3339 / RFC 2822 timestamps (converted to UTC), ISO and common
/// US/long-form calendar layouts, and bare numbers, which are read as serials.
pub fn parse_text(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(serial) = text.parse::<f64>() {
        return from_serial(serial);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc().date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.naive_utc().date());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Interpret a cell as a calendar date, if it holds one.
pub fn parse_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Number(n) => from_serial(*n),
        Cell::Text(s) => parse_text(s),
        Cell::Date(d) => Some(*d),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

/// Interpret a cell as a date, falling back to `today` when it holds none.
pub fn parse_date(cell: &Cell, today: NaiveDate) -> NaiveDate {
    parse_cell(cell).unwrap_or(today)
}
