use comfy_table::{Cell, Table};

use super::ClassifyArgs;
use crate::categorizer::classify;
use crate::error::Result;
use crate::lookups::LookupTables;
use crate::models::{RawRecord, UNKNOWN};
use crate::settings::Settings;
use crate::status::resolve_status;

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

fn record_from(args: &ClassifyArgs) -> RawRecord {
    RawRecord {
        booking_description: non_empty(&args.description),
        booking_type: non_empty(&args.booking_type),
        booking_reference: non_empty(&args.reference),
        service_short_text: non_empty(&args.short_text),
        service_type: non_empty(&args.service_type),
        project_definition: args.project.as_deref().and_then(non_empty),
        wage_type_long_text: non_empty(&args.wage_type),
        attendance_text: non_empty(&args.attendance),
        ..RawRecord::default()
    }
}

fn attendance_label(record: &RawRecord, tables: &LookupTables) -> String {
    tables
        .absence(record.attendance())
        .map_or_else(|| UNKNOWN.to_string(), |code| code.label.clone())
}

pub fn run(args: &ClassifyArgs, settings: &Settings) -> Result<()> {
    let record = record_from(args);
    let rules = settings.active_rules();
    let c = classify(&record, &settings.lookups, &rules);
    let status = resolve_status(&record);

    let mut table = Table::new();
    table.set_header(vec!["Feld", "Wert"]);
    table.add_row(vec![Cell::new("Kategorie"), Cell::new(c.category)]);
    table.add_row(vec![Cell::new("Unterkategorie"), Cell::new(&c.subcategory)]);
    table.add_row(vec![Cell::new("Unterkategorie Name"), Cell::new(&c.subcategory_name)]);
    table.add_row(vec![Cell::new("Status"), Cell::new(status)]);
    table.add_row(vec![
        Cell::new("Abwesenheitsart"),
        Cell::new(attendance_label(&record, &settings.lookups)),
    ]);
    println!("{table}");
    Ok(())
}
