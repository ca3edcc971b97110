use std::collections::BTreeMap;

use tracing::info;

use crate::categorizer::{classify, Rule};
use crate::error::Result;
use crate::lookups::LookupTables;
use crate::models::{Category, ClassifiedRecord, PivotTable, RawRecord, RawTable};
use crate::normalizer::normalize;
use crate::pivot::aggregate;
use crate::status::resolve_status;

/// Everything one transform run needs, resolved from settings and flags.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub tables: LookupTables,
    pub rules: Vec<Rule>,
    pub date_format: String,
    pub all_months: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TransformReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub undated_records: usize,
    pub undated_amount: f64,
    pub category_counts: BTreeMap<Category, usize>,
}

/// Classify and resolve status. The raw attendance code is replaced by the status label.
pub fn classify_records(
    records: Vec<RawRecord>,
    tables: &LookupTables,
    rules: &[Rule],
) -> Vec<ClassifiedRecord> {
    records
        .into_iter()
        .map(|mut record| {
            let c = classify(&record, tables, rules);
            let status = resolve_status(&record);
            record.attendance_text = Some(status.label().to_string());
            ClassifiedRecord {
                record,
                status,
                category: c.category,
                subcategory: c.subcategory,
                subcategory_name: c.subcategory_name,
            }
        })
        .collect()
}

pub fn transform(raw: &RawTable, config: &EngineConfig) -> Result<(PivotTable, TransformReport)> {
    let records = normalize(raw, &config.date_format)?;
    let input_rows = records.len();
    let classified = classify_records(records, &config.tables, &config.rules);

    let mut category_counts = BTreeMap::new();
    for rec in &classified {
        *category_counts.entry(rec.category).or_insert(0) += 1;
    }

    let agg = aggregate(&classified, config.all_months);
    let report = TransformReport {
        input_rows,
        output_rows: agg.table.rows.len(),
        undated_records: agg.undated_records,
        undated_amount: agg.undated_amount,
        category_counts,
    };
    info!(
        input = report.input_rows,
        output = report.output_rows,
        undated = report.undated_records,
        "transform complete"
    );
    Ok((agg.table, report))
}
