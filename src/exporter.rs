use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::Result;
use crate::fmt::plain;
use crate::models::{LongTable, PivotTable};

pub const LONG_MONTH_HEADER: &str = "Monat";
pub const LONG_ORDER_HEADER: &str = "Monatsnummer";
pub const LONG_VALUE_HEADER: &str = "Wert";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// `<dir>/<stem>_<suffix>.<ext>` next to the input file.
pub fn default_output_path(input: &Path, suffix: &str, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("export");
    input.with_file_name(format!("{stem}_{suffix}.{}", format.extension()))
}

pub fn write_wide<W: Write>(table: &PivotTable, format: OutputFormat, writer: W) -> Result<()> {
    match format {
        OutputFormat::Csv => write_wide_csv(table, writer),
        OutputFormat::Json => write_wide_json(table, writer),
    }
}

pub fn write_wide_csv<W: Write>(table: &PivotTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.headers())?;
    for row in &table.rows {
        let mut record = row.key.clone();
        record.extend(table.months.iter().map(|m| plain(row.value(*m))));
        record.push(plain(row.ytd));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_wide_json<W: Write>(table: &PivotTable, mut writer: W) -> Result<()> {
    let rows: Vec<Value> = table
        .rows
        .iter()
        .map(|row| {
            let mut obj = Map::new();
            for (header, value) in table.key_headers.iter().zip(&row.key) {
                obj.insert(header.clone(), Value::String(value.clone()));
            }
            for m in &table.months {
                obj.insert(m.label().to_string(), Value::from(row.value(*m)));
            }
            obj.insert(crate::models::YTD_HEADER.to_string(), Value::from(row.ytd));
            Value::Object(obj)
        })
        .collect();
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_long<W: Write>(long: &LongTable, format: OutputFormat, writer: W) -> Result<()> {
    match format {
        OutputFormat::Csv => write_long_csv(long, writer),
        OutputFormat::Json => write_long_json(long, writer),
    }
}

pub fn write_long_csv<W: Write>(long: &LongTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut headers = long.key_headers.clone();
    headers.extend([LONG_MONTH_HEADER, LONG_ORDER_HEADER, LONG_VALUE_HEADER].map(String::from));
    wtr.write_record(&headers)?;
    for row in &long.rows {
        let mut record = row.key.clone();
        record.push(row.month.label().to_string());
        record.push(row.month_order().to_string());
        record.push(plain(row.value));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_long_json<W: Write>(long: &LongTable, mut writer: W) -> Result<()> {
    let rows: Vec<Value> = long
        .rows
        .iter()
        .map(|row| {
            let mut obj = Map::new();
            for (header, value) in long.key_headers.iter().zip(&row.key) {
                obj.insert(header.clone(), Value::String(value.clone()));
            }
            obj.insert(LONG_MONTH_HEADER.to_string(), Value::from(row.month.label()));
            obj.insert(LONG_ORDER_HEADER.to_string(), Value::from(row.month_order()));
            obj.insert(LONG_VALUE_HEADER.to_string(), Value::from(row.value));
            Value::Object(obj)
        })
        .collect();
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writeln!(writer)?;
    Ok(())
}

/// Create parent directories and write via `f`.
pub fn write_file<F>(path: &Path, f: F) -> Result<()>
where
    F: FnOnce(std::io::BufWriter<std::fs::File>) -> Result<()>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    f(std::io::BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AggregatedRow, Month};
    use crate::reshape::melt;

    fn table() -> PivotTable {
        let mut values = [0.0; 12];
        values[0] = 10.0;
        values[1] = 5.5;
        PivotTable {
            key_headers: vec!["U-Nummer".to_string(), "Kategorie".to_string()],
            months: vec![Month::Januar, Month::Februar],
            rows: vec![AggregatedRow {
                key: vec!["4711".to_string(), "ICT".to_string()],
                values,
                ytd: 15.5,
            }],
        }
    }

    #[test]
    fn test_wide_csv() {
        let mut buf = Vec::new();
        write_wide_csv(&table(), &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out, "U-Nummer,Kategorie,Januar,Februar,ytd\n4711,ICT,10,5.5,15.5\n");
    }

    #[test]
    fn test_wide_csv_months_sum_to_written_ytd() {
        let mut values = [0.0; 12];
        values[0] = 0.125;
        values[1] = 0.125;
        values[2] = 1.0 / 3.0;
        let mut t = PivotTable {
            key_headers: vec!["U-Nummer".to_string()],
            months: vec![Month::Januar, Month::Februar, Month::Maerz],
            rows: vec![AggregatedRow { key: vec!["a".to_string()], values, ytd: 0.0 }],
        };
        t.recompute_ytd();
        let mut buf = Vec::new();
        write_wide_csv(&t, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let line = out.lines().nth(1).unwrap();
        assert!(line.starts_with("a,0.125,0.125,0.3333333333333333,"));
        let fields: Vec<f64> = line.split(',').skip(1).map(|f| f.parse().unwrap()).collect();
        let months: f64 = fields[..3].iter().sum();
        assert_eq!(months, fields[3]);
        assert_eq!(fields[3], t.rows[0].ytd);
    }

    #[test]
    fn test_wide_json_keeps_values_numeric() {
        let mut buf = Vec::new();
        write_wide_json(&table(), &mut buf).unwrap();
        let parsed: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["U-Nummer"], "4711");
        assert_eq!(parsed[0]["Februar"], 5.5);
        assert_eq!(parsed[0]["ytd"], 15.5);
    }

    #[test]
    fn test_long_csv_has_month_order() {
        let mut buf = Vec::new();
        write_long_csv(&melt(&table()), &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "U-Nummer,Kategorie,Monat,Monatsnummer,Wert");
        assert_eq!(lines[1], "4711,ICT,Januar,1,10");
        assert_eq!(lines[2], "4711,ICT,Februar,2,5.5");
    }

    #[test]
    fn test_default_output_path() {
        let p = default_output_path(Path::new("/data/export.xlsx"), "transformed", OutputFormat::Csv);
        assert_eq!(p, PathBuf::from("/data/export_transformed.csv"));
    }

    #[test]
    fn test_write_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("t.csv");
        write_file(&path, |w| write_wide_csv(&table(), w)).unwrap();
        assert!(path.exists());
    }
}
