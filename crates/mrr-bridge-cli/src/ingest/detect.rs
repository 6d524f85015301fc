use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use mrr_bridge_core::MrrError;

use super::table::RawTable;

/// Header names commonly used for the customer identifier column.
const CUSTOMER_CANDIDATES: &[&str] = &[
    "Customer",
    "Client",
    "Customer Name",
    "Client Name",
    "Company",
    "Company Name",
    "Entity",
    "Account",
];

/// Grouping dimensions that must never be mistaken for a customer column.
const DIMENSION_COLUMNS: &[&str] = &["Country", "Industry", "Geography"];

/// Locate the customer identifier column.
///
/// Tries the candidate names first (case-insensitive), then falls back to
/// the first column that is not a known grouping dimension and whose
/// non-empty cells are mostly non-numeric.
pub fn find_customer_column(table: &RawTable) -> Result<usize, MrrError> {
    for candidate in CUSTOMER_CANDIDATES {
        if let Some(idx) = table.column_index(candidate) {
            return Ok(idx);
        }
    }

    for (idx, header) in table.headers.iter().enumerate() {
        let h = header.trim();
        if DIMENSION_COLUMNS.iter().any(|d| d.eq_ignore_ascii_case(h)) {
            continue;
        }
        if column_is_mostly_text(table, idx) {
            return Ok(idx);
        }
    }

    Err(MrrError::NoCustomerColumn)
}

/// Locate monthly revenue columns and return their indices in chronological
/// order.
///
/// A header is a month column when it parses as a date under one of the
/// accepted formats. If nothing parses, any header carrying a plausible
/// 4-digit year is taken in header order as a last resort.
pub fn find_month_columns(table: &RawTable) -> Vec<usize> {
    let mut dated: Vec<(usize, NaiveDate)> = table
        .headers
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| parse_month_header(h).map(|d| (idx, d)))
        .collect();

    if !dated.is_empty() {
        dated.sort_by_key(|&(_, date)| date);
        return dated.into_iter().map(|(idx, _)| idx).collect();
    }

    table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| contains_year(h))
        .map(|(idx, _)| idx)
        .collect()
}

/// Parse a month column header into a date.
///
/// Accepts full dates (with or without a time component), year-month pairs,
/// and "Jan 2024"-style labels.
pub fn parse_month_header(header: &str) -> Option<NaiveDate> {
    let h = header.trim();
    if h.is_empty() {
        return None;
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(h, fmt) {
            return Some(date);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{h}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    for fmt in ["%d %b %Y", "%d %B %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("01 {h}"), fmt) {
            return Some(date);
        }
    }
    None
}

fn contains_year(header: &str) -> bool {
    let bytes = header.as_bytes();
    bytes.windows(4).any(|w| {
        w.iter().all(u8::is_ascii_digit) && (w.starts_with(b"19") || w.starts_with(b"20"))
    })
}

fn column_is_mostly_text(table: &RawTable, idx: usize) -> bool {
    let mut seen = 0usize;
    let mut text = 0usize;
    for row in &table.rows {
        let Some(cell) = row.get(idx) else { continue };
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        seen += 1;
        if Decimal::from_str(cell).is_err() {
            text += 1;
        }
    }
    seen > 0 && text * 2 > seen
}
