pub mod cache;
pub mod detect;
pub mod table;

use mrr_bridge_core::aggregate::RevenueRow;
use mrr_bridge_core::quarterly::GroupedRow;
use mrr_bridge_core::MrrError;

use cache::LoadCache;
use table::RawTable;

/// Load a CSV revenue table and shape it into per-customer monthly rows for
/// the period aggregator, returning the rows plus the month column labels.
///
/// The customer column is auto-detected unless `customer_col` names one
/// explicitly; month columns are detected and sorted chronologically.
pub fn load_revenue_rows(
    cache: &mut LoadCache,
    path: &str,
    customer_col: Option<&str>,
) -> Result<(Vec<RevenueRow>, Vec<String>), Box<dyn std::error::Error>> {
    let table = cache.load(path)?;

    let customer_idx = match customer_col {
        Some(name) => table
            .column_index(name)
            .ok_or_else(|| MrrError::InvalidInput {
                field: "customer_col".to_string(),
                reason: format!("column '{name}' not found in table"),
            })?,
        None => detect::find_customer_column(&table)?,
    };

    let month_idx = detect::find_month_columns(&table);
    if month_idx.is_empty() {
        return Err(MrrError::InsufficientPeriods {
            found: 0,
            required: mrr_bridge_core::aggregate::REQUIRED_MONTHS,
        }
        .into());
    }

    let labels: Vec<String> = month_idx.iter().map(|&i| table.headers[i].clone()).collect();
    let rows = shape_rows(&table, customer_idx, &month_idx);
    Ok((rows, labels))
}

/// Load a CSV revenue table and shape it into dimension-grouped monthly rows
/// for the quarterly breakdown.
pub fn load_grouped_rows(
    cache: &mut LoadCache,
    path: &str,
    dimension: &str,
) -> Result<(Vec<GroupedRow>, Vec<String>), Box<dyn std::error::Error>> {
    let table = cache.load(path)?;

    let group_idx = table
        .column_index(dimension)
        .ok_or_else(|| MrrError::InvalidInput {
            field: "group_by".to_string(),
            reason: format!("column '{dimension}' not found in table"),
        })?;

    let month_idx = detect::find_month_columns(&table);
    if month_idx.is_empty() {
        return Err(MrrError::InvalidInput {
            field: "table".to_string(),
            reason: "no monthly revenue columns detected".to_string(),
        }
        .into());
    }

    let labels: Vec<String> = month_idx.iter().map(|&i| table.headers[i].clone()).collect();
    let rows = shape_rows(&table, group_idx, &month_idx)
        .into_iter()
        .map(|r| GroupedRow {
            group: r.customer_id,
            months: r.months,
        })
        .collect();
    Ok((rows, labels))
}

fn shape_rows(table: &RawTable, key_idx: usize, month_idx: &[usize]) -> Vec<RevenueRow> {
    table
        .rows
        .iter()
        .map(|row| RevenueRow {
            customer_id: row.get(key_idx).cloned().unwrap_or_default(),
            months: month_idx
                .iter()
                .map(|&i| table::parse_money(row.get(i).map(String::as_str).unwrap_or("")))
                .collect(),
        })
        .collect()
}
