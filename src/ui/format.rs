//! Display formatting for trademark hits.

use chrono::NaiveDate;
use itertools::Itertools;

use crate::model::types::HitSource;

/// How many class codes are shown before the overflow marker.
const CLASS_DISPLAY_LIMIT: usize = 4;

/// Render an 8-digit `YYYYMMDD` first-use date for display.
///
/// Anything other than exactly 8 digits forming a real calendar date renders
/// as "N/A"; a malformed date is displayable, never an error.
pub fn format_first_use_date(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "N/A".to_string();
    };
    let raw = raw.trim();
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return "N/A".to_string();
    }
    match NaiveDate::parse_from_str(raw, "%Y%m%d") {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => "N/A".to_string(),
    }
}

/// Render class codes, truncated to four entries with an overflow marker.
pub fn format_class_codes(codes: &[String]) -> String {
    let shown = codes
        .iter()
        .take(CLASS_DISPLAY_LIMIT)
        .map(|code| format!("Class {code}"))
        .join(", ");
    if codes.len() > CLASS_DISPLAY_LIMIT {
        format!("{shown}, ...")
    } else {
        shown
    }
}

/// First mark-description entry, if the record carries one.
pub fn description_snippet(source: &HitSource) -> Option<&str> {
    source
        .mark_description_description
        .as_deref()
        .and_then(|entries| entries.first())
        .map(String::as_str)
}

/// The "Live / registered" style status line shown on each card.
pub fn status_line(source: &HitSource) -> String {
    format!("Live / {}", source.status_type)
}
