use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::quantity;
use crate::importer::read_table;
use crate::models::PivotTable;
use crate::pipeline::transform;
use crate::reports::{summarize, top_by_ytd, GroupTotals};
use crate::settings::Settings;

pub fn run(file: &str, settings: &Settings, top: usize) -> Result<()> {
    let raw = read_table(&PathBuf::from(file), &settings.sheet_name)?;
    let (table, report) = transform(&raw, &settings.engine())?;
    let summary = summarize(&table);

    println!("{}", "Overview".bold());
    println!("  Records:     {}", report.input_rows);
    println!("  Pivot rows:  {}", summary.rows);
    println!("  Employees:   {}", summary.employees);
    println!("  Projects:    {}", summary.projects);
    println!("  Total YTD:   {}", quantity(summary.total_ytd).green().bold());
    if let (Some(peak), Some(low)) = (summary.peak_month, summary.low_month) {
        println!(
            "  Peak month:  {peak} ({})",
            quantity(summary.month_totals[peak.index()])
        );
        println!(
            "  Low month:   {low} ({})",
            quantity(summary.month_totals[low.index()])
        );
    }
    if report.undated_records > 0 {
        println!(
            "  {}",
            format!(
                "{} undated records ({}) not included",
                report.undated_records,
                quantity(report.undated_amount)
            )
            .yellow()
        );
    }
    println!();

    println!("By category\n{}", month_table(&table, &summary.by_category, "Kategorie"));
    println!("By status\n{}", month_table(&table, &summary.by_status, "Status"));

    let leaders = top_by_ytd(&table, "Unterkategorie Name", top);
    let mut t = Table::new();
    t.set_header(vec!["Unterkategorie", "YTD"]);
    for g in &leaders {
        t.add_row(vec![Cell::new(&g.name), Cell::new(quantity(g.ytd))]);
    }
    println!("Top {top} subcategories\n{t}");
    Ok(())
}

fn month_table(table: &PivotTable, groups: &[GroupTotals], label: &str) -> Table {
    let mut t = Table::new();
    let mut header = vec![label.to_string()];
    header.extend(table.months.iter().map(|m| m.label().to_string()));
    header.push("YTD".to_string());
    t.set_header(header);

    for g in groups {
        let mut row = vec![Cell::new(&g.name)];
        row.extend(
            table
                .months
                .iter()
                .map(|m| Cell::new(quantity(g.values[m.index()]))),
        );
        row.push(Cell::new(quantity(g.ytd)));
        t.add_row(row);
    }

    let mut total = vec![Cell::new("Total".bold())];
    total.extend(table.months.iter().map(|m| {
        let sum: f64 = groups.iter().map(|g| g.values[m.index()]).sum();
        Cell::new(quantity(sum))
    }));
    total.push(Cell::new(quantity(groups.iter().map(|g| g.ytd).sum())).fg(comfy_table::Color::Green));
    t.add_row(total);
    t
}
