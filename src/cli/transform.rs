use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::exporter::{default_output_path, write_file, write_long, write_wide, OutputFormat};
use crate::fmt::quantity;
use crate::importer::read_table;
use crate::models::Category;
use crate::pipeline::{transform, TransformReport};
use crate::reshape::melt;
use crate::settings::Settings;

pub struct TransformOptions {
    pub output: Option<String>,
    pub format: OutputFormat,
    pub all_months: bool,
    pub long: bool,
}

pub fn run(file: &str, settings: &Settings, opts: TransformOptions) -> Result<()> {
    let input = PathBuf::from(file);
    let raw = read_table(&input, &settings.sheet_name)?;

    let mut engine = settings.engine();
    engine.all_months |= opts.all_months;
    let (table, report) = transform(&raw, &engine)?;

    let output = opts
        .output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(&input, "transformed", opts.format));
    write_file(&output, |w| write_wide(&table, opts.format, w))?;
    println!("Wrote {} rows to {}", report.output_rows, output.display());

    if opts.long {
        let long_path = long_path_for(&output, opts.format);
        let long = melt(&table);
        write_file(&long_path, |w| write_long(&long, opts.format, w))?;
        println!("Wrote {} rows to {}", long.rows.len(), long_path.display());
    }

    print_report(&report);
    Ok(())
}

fn long_path_for(output: &Path, format: OutputFormat) -> PathBuf {
    default_output_path(output, "long", format)
}

fn print_report(report: &TransformReport) {
    println!(
        "{} input records, {} pivot rows",
        report.input_rows, report.output_rows
    );
    let counts: Vec<String> = Category::ALL
        .iter()
        .filter_map(|cat| report.category_counts.get(cat).map(|n| format!("{cat}: {n}")))
        .collect();
    if !counts.is_empty() {
        println!("  {}", counts.join(", "));
    }
    if report.undated_records > 0 {
        println!(
            "{} records without a valid date skipped ({} hours)",
            report.undated_records,
            quantity(report.undated_amount)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_path_sits_next_to_output() {
        let p = long_path_for(Path::new("/tmp/out/export_transformed.csv"), OutputFormat::Csv);
        assert_eq!(p, PathBuf::from("/tmp/out/export_transformed_long.csv"));
    }

    #[test]
    fn test_run_writes_wide_and_long() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("export.csv");
        std::fs::write(
            &input,
            "OE;Personalnummer;Name des Mitarbeiters bzw. Bewerbers;Datum;Kontierungstext;\
             Kontierung (Empf.);Allgemeiner Empfänger;Kurztext;Leistungsart;EmpfKostenstelle;\
             Empfänger-PSP-Element;Lohnart-Langtext;Anzahl (Maßeinheit);Ab-/Anwesenheitsart\n\
             OE-1;4711;Muster;10.01.2025;Wartung;Auftrag;123;MON;Operation;8001;P-1;;8;2000\n",
        )
        .unwrap();
        let output = dir.path().join("wide.csv");
        let opts = TransformOptions {
            output: Some(output.to_string_lossy().into_owned()),
            format: OutputFormat::Csv,
            all_months: false,
            long: true,
        };
        run(input.to_str().unwrap(), &Settings::default(), opts).unwrap();
        let wide = std::fs::read_to_string(&output).unwrap();
        assert!(wide.lines().next().unwrap().ends_with("Januar,ytd"));
        assert!(dir.path().join("wide_long.csv").exists());
    }
}
