//! Date-cell normalization at the store boundary.
//!
//! Backing media do not round-trip dates faithfully: a cell written as
//! `2024-01-07` may come back as an RFC 3339 timestamp after a manual edit
//! or an import. The core only ever sees canonical `YYYY-MM-DD` strings, so
//! normalization happens here, on read.

use chrono::NaiveDate;

/// Reduce a date-ish cell to canonical `YYYY-MM-DD` form.
///
/// Accepts the canonical form itself and any value whose first ten
/// characters are a valid date followed by a time suffix (`T...` or
/// ` HH:MM...`). Anything else is returned trimmed but untouched, so a
/// genuinely malformed key still fails validation downstream instead of
/// being silently rewritten.
pub fn normalize_date_cell(cell: &str) -> String {
    let trimmed = cell.trim();
    // Byte 10 may fall inside a multi-byte character on garbage input.
    if trimmed.len() > 10 && trimmed.is_char_boundary(10) {
        let (head, tail) = trimmed.split_at(10);
        let separator_ok = matches!(tail.as_bytes().first(), Some(b'T') | Some(b' '));
        if separator_ok && NaiveDate::parse_from_str(head, "%Y-%m-%d").is_ok() {
            return head.to_string();
        }
    }
    trimmed.to_string()
}
