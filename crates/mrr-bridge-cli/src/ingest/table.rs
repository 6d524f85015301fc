use rust_decimal::Decimal;
use std::str::FromStr;

use mrr_bridge_core::{Money, MrrError};

/// A parsed tabular upload: header row plus string cells.
///
/// Cells stay as strings until a consumer decides how to coerce them; money
/// coercion happens through [`parse_money`].
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Case-insensitive header lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == wanted)
    }
}

/// Parse CSV bytes into a `RawTable`.
///
/// Ragged rows are tolerated; missing cells read back as empty strings at
/// the consumer. A table with no header row is an empty upload.
pub fn parse_csv(bytes: &[u8]) -> Result<RawTable, MrrError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| MrrError::InvalidInput {
            field: "table".to_string(),
            reason: format!("unreadable CSV header: {e}"),
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        return Err(MrrError::EmptyTable("no header row".to_string()));
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| MrrError::InvalidInput {
            field: "table".to_string(),
            reason: format!("unreadable CSV record: {e}"),
        })?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(RawTable { headers, rows })
}

/// Coerce one revenue cell to `Money`.
///
/// Currency symbols and thousands separators are stripped; anything that
/// still fails to parse (including empty cells) is 0, matching the
/// aggregation contract for missing or non-numeric month values.
pub fn parse_money(cell: &str) -> Money {
    let cleaned: String = cell
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_csv_basic() {
        let data = b"Customer,2024-01,2024-02\nAcme,100,200\nGlobex,50,\n";
        let table = parse_csv(data).unwrap();
        assert_eq!(table.headers, vec!["Customer", "2024-01", "2024-02"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["Acme", "100", "200"]);
    }

    #[test]
    fn test_column_index_case_insensitive() {
        let data = b"Customer Name,Country\nAcme,US\n";
        let table = parse_csv(data).unwrap();
        assert_eq!(table.column_index("customer name"), Some(0));
        assert_eq!(table.column_index("COUNTRY"), Some(1));
        assert_eq!(table.column_index("Industry"), None);
    }

    #[test]
    fn test_parse_money_coercion() {
        assert_eq!(parse_money("1234.56"), dec!(1234.56));
        assert_eq!(parse_money(" $1,234.56 "), dec!(1234.56));
        assert_eq!(parse_money(""), dec!(0));
        assert_eq!(parse_money("n/a"), dec!(0));
        assert_eq!(parse_money("-10"), dec!(-10));
    }
}
