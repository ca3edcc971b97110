//! Wide ↔ long reshaping of pivot tables.
//!
//! `melt` turns each (row, month) pair into its own record carrying an
//! explicit month number, so consumers never sort month names lexically.
//! `pivot_long` is the inverse. `load_wide` reads a previously exported wide
//! table and insists on all twelve month columns.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{KontierungError, Result};
use crate::models::{AggregatedRow, LongRow, LongTable, Month, PivotTable, RawTable, YTD_HEADER};
use crate::normalizer::{cell_to_amount, cell_to_string};

/// Month-major: all rows for Januar, then all rows for Februar, ...
pub fn melt(table: &PivotTable) -> LongTable {
    let rows = table
        .months
        .iter()
        .flat_map(|month| {
            table.rows.iter().map(move |row| LongRow {
                key: row.key.clone(),
                month: *month,
                value: row.value(*month),
            })
        })
        .collect();
    LongTable {
        key_headers: table.key_headers.clone(),
        rows,
    }
}

pub fn pivot_long(long: &LongTable) -> PivotTable {
    let mut groups: BTreeMap<Vec<String>, [f64; 12]> = BTreeMap::new();
    let mut months: BTreeSet<Month> = BTreeSet::new();
    for row in &long.rows {
        months.insert(row.month);
        groups.entry(row.key.clone()).or_insert([0.0; 12])[row.month.index()] += row.value;
    }
    let mut table = PivotTable {
        key_headers: long.key_headers.clone(),
        months: months.into_iter().collect(),
        rows: groups
            .into_iter()
            .map(|(key, values)| AggregatedRow { key, values, ytd: 0.0 })
            .collect(),
    };
    table.recompute_ytd();
    table
}

/// Parse a wide table. Every column that is neither a month nor `ytd` is a key column.
pub fn load_wide(raw: &RawTable) -> Result<PivotTable> {
    let month_cols: Vec<Option<usize>> = Month::ALL
        .iter()
        .map(|m| raw.headers.iter().position(|h| h.trim() == m.label()))
        .collect();
    let missing: Vec<String> = Month::ALL
        .iter()
        .zip(&month_cols)
        .filter(|(_, col)| col.is_none())
        .map(|(m, _)| m.label().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(KontierungError::MissingMonthColumns(missing));
    }
    let month_cols: Vec<usize> = month_cols.into_iter().flatten().collect();

    let key_cols: Vec<usize> = (0..raw.headers.len())
        .filter(|i| !month_cols.contains(i) && raw.headers[*i].trim() != YTD_HEADER)
        .collect();

    let rows = raw
        .rows
        .iter()
        .map(|cells| {
            let key = key_cols
                .iter()
                .map(|i| cells.get(*i).and_then(cell_to_string).unwrap_or_default())
                .collect();
            let mut values = [0.0; 12];
            for (slot, col) in month_cols.iter().enumerate() {
                values[slot] = cells.get(*col).map_or(0.0, cell_to_amount);
            }
            AggregatedRow { key, values, ytd: 0.0 }
        })
        .collect();

    let mut table = PivotTable {
        key_headers: key_cols.iter().map(|i| raw.headers[*i].trim().to_string()).collect(),
        months: Month::ALL.to_vec(),
        rows,
    };
    table.recompute_ytd();
    Ok(table)
}
