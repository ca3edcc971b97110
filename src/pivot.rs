use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::models::{AggregatedRow, ClassifiedRecord, Month, PivotTable, KEY_HEADERS, UNKNOWN};

pub struct Aggregation {
    pub table: PivotTable,
    /// Records without a booking date; they fall into no month bucket.
    pub undated_records: usize,
    pub undated_amount: f64,
}

fn or_unknown(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| UNKNOWN.to_string())
}

/// Grouping key in `KEY_HEADERS` order, with missing values already replaced.
pub fn group_key(rec: &ClassifiedRecord) -> Vec<String> {
    let r = &rec.record;
    vec![
        or_unknown(&r.org_unit),
        or_unknown(&r.employee_id),
        or_unknown(&r.employee_name),
        or_unknown(&r.booking_description),
        or_unknown(&r.booking_type),
        or_unknown(&r.booking_reference),
        or_unknown(&r.service_short_text),
        or_unknown(&r.service_type),
        or_unknown(&r.receiving_cost_center),
        or_unknown(&r.project_definition),
        or_unknown(&r.wage_type_long_text),
        rec.status.label().to_string(),
        rec.category.label().to_string(),
        rec.subcategory.clone(),
        rec.subcategory_name.clone(),
    ]
}

/// Sum amounts per grouping key and month, then pivot to one row per key.
///
/// Only months that occur in the input become columns unless `all_months`
/// is set. Rows come out sorted by key.
pub fn aggregate(records: &[ClassifiedRecord], all_months: bool) -> Aggregation {
    let mut groups: BTreeMap<Vec<String>, [f64; 12]> = BTreeMap::new();
    let mut present: BTreeSet<Month> = BTreeSet::new();
    let mut undated_records = 0usize;
    let mut undated_amount = 0.0;

    for rec in records {
        let Some(date) = rec.record.booking_date else {
            undated_records += 1;
            undated_amount += rec.record.amount;
            continue;
        };
        let month = Month::of_date(&date);
        present.insert(month);
        let values = groups.entry(group_key(rec)).or_insert([0.0; 12]);
        values[month.index()] += rec.record.amount;
    }

    if undated_records > 0 {
        warn!(
            records = undated_records,
            amount = undated_amount,
            "records without a valid date were left out of the monthly columns"
        );
    }

    let months: Vec<Month> = if all_months {
        Month::ALL.to_vec()
    } else {
        present.into_iter().collect()
    };

    let mut table = PivotTable {
        key_headers: KEY_HEADERS.iter().map(|h| h.to_string()).collect(),
        months,
        rows: groups
            .into_iter()
            .map(|(key, values)| AggregatedRow { key, values, ytd: 0.0 })
            .collect(),
    };
    table.recompute_ytd();
    debug!(rows = table.rows.len(), months = table.months.len(), "pivoted");

    Aggregation {
        table,
        undated_records,
        undated_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, RawRecord, Status};
    use chrono::NaiveDate;

    fn rec(date: Option<(i32, u32, u32)>, amount: f64) -> ClassifiedRecord {
        ClassifiedRecord {
            record: RawRecord {
                org_unit: Some("OE-1".to_string()),
                employee_id: Some("4711".to_string()),
                employee_name: Some("Muster Hans".to_string()),
                booking_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                project_definition: Some("P-1".to_string()),
                amount,
                attendance_text: Some(Status::Arbeit.label().to_string()),
                ..RawRecord::default()
            },
            status: Status::Arbeit,
            category: Category::Anderes,
            subcategory: String::new(),
            subcategory_name: String::new(),
        }
    }

    #[test]
    fn test_two_months_one_row() {
        let records = vec![rec(Some((2025, 1, 10)), 10.0), rec(Some((2025, 2, 3)), 5.0)];
        let agg = aggregate(&records, false);
        let t = &agg.table;
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.months, vec![Month::Januar, Month::Februar]);
        let row = &t.rows[0];
        assert_eq!(row.value(Month::Januar), 10.0);
        assert_eq!(row.value(Month::Februar), 5.0);
        assert_eq!(row.value(Month::Maerz), 0.0);
        assert_eq!(row.ytd, 15.0);
        assert_eq!(agg.undated_records, 0);
    }

    #[test]
    fn test_same_month_sums() {
        let records = vec![rec(Some((2025, 4, 1)), 2.5), rec(Some((2025, 4, 30)), 4.0)];
        let t = aggregate(&records, false).table;
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0].value(Month::April), 6.5);
        assert_eq!(t.headers().last().map(String::as_str), Some("ytd"));
    }

    #[test]
    fn test_missing_key_merges_with_literal_unknown() {
        let mut a = rec(Some((2025, 1, 1)), 1.0);
        a.record.receiving_cost_center = None;
        let mut b = rec(Some((2025, 1, 2)), 2.0);
        b.record.receiving_cost_center = Some(UNKNOWN.to_string());
        let t = aggregate(&[a, b], false).table;
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0].ytd, 3.0);
        assert_eq!(t.rows[0].key_value(&t.key_headers, "EmpfKostenstelle"), Some(UNKNOWN));
    }

    #[test]
    fn test_status_column_comes_from_resolved_status() {
        let mut a = rec(Some((2025, 1, 1)), 1.0);
        a.record.attendance_text = Some("2000".to_string());
        a.status = Status::Abwesend;
        let t = aggregate(&[a], false).table;
        assert_eq!(t.rows[0].key_value(&t.key_headers, "Status"), Some("Abwesend"));
    }

    #[test]
    fn test_distinct_keys_split_rows() {
        let a = rec(Some((2025, 1, 1)), 1.0);
        let mut b = rec(Some((2025, 1, 1)), 1.0);
        b.category = Category::Psp;
        let t = aggregate(&[a, b], false).table;
        assert_eq!(t.rows.len(), 2);
    }

    #[test]
    fn test_undated_records_are_counted() {
        let records = vec![rec(Some((2025, 3, 1)), 8.0), rec(None, 4.0), rec(None, 1.5)];
        let agg = aggregate(&records, false);
        assert_eq!(agg.undated_records, 2);
        assert_eq!(agg.undated_amount, 5.5);
        assert_eq!(agg.table.rows[0].ytd, 8.0);
    }

    #[test]
    fn test_only_undated_yields_no_rows() {
        let agg = aggregate(&[rec(None, 4.0)], false);
        assert!(agg.table.rows.is_empty());
        assert!(agg.table.months.is_empty());
    }

    #[test]
    fn test_all_months_option() {
        let t = aggregate(&[rec(Some((2025, 6, 1)), 3.0)], true).table;
        assert_eq!(t.months.len(), 12);
        assert_eq!(t.headers().len(), KEY_HEADERS.len() + 13);
        assert_eq!(t.rows[0].ytd, 3.0);
    }

    #[test]
    fn test_ytd_equals_month_sum() {
        let records: Vec<_> = (1..=12).map(|m| rec(Some((2025, m, 15)), m as f64)).collect();
        let t = aggregate(&records, false).table;
        for row in &t.rows {
            let sum: f64 = t.months.iter().map(|m| row.value(*m)).sum();
            assert_eq!(sum, row.ytd);
        }
        assert_eq!(t.rows[0].ytd, 78.0);
    }

    #[test]
    fn test_rows_sorted_by_key() {
        let mut a = rec(Some((2025, 1, 1)), 1.0);
        a.record.org_unit = Some("OE-2".to_string());
        let b = rec(Some((2025, 1, 1)), 1.0);
        let t = aggregate(&[a, b], false).table;
        assert_eq!(t.rows[0].key[0], "OE-1");
        assert_eq!(t.rows[1].key[0], "OE-2");
    }
}
