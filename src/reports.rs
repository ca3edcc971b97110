use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Month, PivotTable};

// ---------------------------------------------------------------------------
// Category × month breakdown
// ---------------------------------------------------------------------------

pub struct GroupTotals {
    pub name: String,
    pub values: [f64; 12],
    pub ytd: f64,
}

/// Sum month values and YTD per distinct value of `header`, ordered by name.
pub fn totals_by(table: &PivotTable, header: &str) -> Vec<GroupTotals> {
    let mut groups: BTreeMap<String, ([f64; 12], f64)> = BTreeMap::new();
    for row in &table.rows {
        let name = row
            .key_value(&table.key_headers, header)
            .unwrap_or("")
            .to_string();
        let entry = groups.entry(name).or_insert(([0.0; 12], 0.0));
        for m in &table.months {
            entry.0[m.index()] += row.value(*m);
        }
        entry.1 += row.ytd;
    }
    groups
        .into_iter()
        .map(|(name, (values, ytd))| GroupTotals { name, values, ytd })
        .collect()
}

// ---------------------------------------------------------------------------
// Headline figures
// ---------------------------------------------------------------------------

pub struct Summary {
    pub total_ytd: f64,
    pub rows: usize,
    pub employees: usize,
    pub projects: usize,
    pub month_totals: [f64; 12],
    pub peak_month: Option<Month>,
    pub low_month: Option<Month>,
    pub by_category: Vec<GroupTotals>,
    pub by_status: Vec<GroupTotals>,
}

fn distinct(table: &PivotTable, header: &str) -> usize {
    table
        .rows
        .iter()
        .filter_map(|r| r.key_value(&table.key_headers, header))
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn summarize(table: &PivotTable) -> Summary {
    let mut month_totals = [0.0; 12];
    for row in &table.rows {
        for m in &table.months {
            month_totals[m.index()] += row.value(*m);
        }
    }
    // First month wins ties, matching column order.
    let mut peak_month: Option<Month> = None;
    let mut low_month: Option<Month> = None;
    for m in &table.months {
        let v = month_totals[m.index()];
        if peak_month.map_or(true, |p| v > month_totals[p.index()]) {
            peak_month = Some(*m);
        }
        if low_month.map_or(true, |l| v < month_totals[l.index()]) {
            low_month = Some(*m);
        }
    }

    Summary {
        total_ytd: table.total_ytd(),
        rows: table.rows.len(),
        employees: distinct(table, "U-Nummer"),
        projects: distinct(table, "Projektdefinition"),
        month_totals,
        peak_month,
        low_month,
        by_category: totals_by(table, "Kategorie"),
        by_status: totals_by(table, "Status"),
    }
}

/// Largest `n` groups of `header` by YTD, ties broken by name.
pub fn top_by_ytd(table: &PivotTable, header: &str, n: usize) -> Vec<GroupTotals> {
    let mut groups = totals_by(table, header);
    groups.sort_by(|a, b| b.ytd.total_cmp(&a.ytd).then_with(|| a.name.cmp(&b.name)));
    groups.truncate(n);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AggregatedRow;

    fn row(emp: &str, cat: &str, sub: &str, project: &str, jan: f64, feb: f64) -> AggregatedRow {
        let mut values = [0.0; 12];
        values[0] = jan;
        values[1] = feb;
        AggregatedRow {
            key: vec![emp.into(), cat.into(), sub.into(), project.into(), "Arbeit".into()],
            values,
            ytd: jan + feb,
        }
    }

    fn table() -> PivotTable {
        PivotTable {
            key_headers: ["U-Nummer", "Kategorie", "Unterkategorie", "Projektdefinition", "Status"]
                .map(String::from)
                .to_vec(),
            months: vec![Month::Januar, Month::Februar],
            rows: vec![
                row("1", "ICT", "12345678", "P-1", 10.0, 2.0),
                row("1", "PSP", "7654321", "P-2", 1.0, 4.0),
                row("2", "ICT", "12345678", "P-1", 3.0, 0.0),
            ],
        }
    }

    #[test]
    fn test_summary_headline() {
        let s = summarize(&table());
        assert_eq!(s.total_ytd, 20.0);
        assert_eq!(s.rows, 3);
        assert_eq!(s.employees, 2);
        assert_eq!(s.projects, 2);
        assert_eq!(s.month_totals[0], 14.0);
        assert_eq!(s.month_totals[1], 6.0);
        assert_eq!(s.peak_month, Some(Month::Januar));
        assert_eq!(s.low_month, Some(Month::Februar));
    }

    #[test]
    fn test_totals_by_category() {
        let totals = totals_by(&table(), "Kategorie");
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].name, "ICT");
        assert_eq!(totals[0].values[0], 13.0);
        assert_eq!(totals[0].ytd, 15.0);
        assert_eq!(totals[1].name, "PSP");
        let sum: f64 = totals.iter().map(|t| t.ytd).sum();
        assert_eq!(sum, 20.0);
    }

    #[test]
    fn test_top_by_ytd() {
        let top = top_by_ytd(&table(), "Unterkategorie", 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "12345678");
    }

    #[test]
    fn test_empty_table() {
        let s = summarize(&PivotTable::default());
        assert_eq!(s.total_ytd, 0.0);
        assert_eq!(s.peak_month, None);
        assert!(s.by_category.is_empty());
    }
}
