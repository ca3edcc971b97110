use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::Result;
use crate::exporter::{default_output_path, write_file, write_long, OutputFormat};
use crate::importer::read_table;
use crate::reshape::{load_wide, melt, pivot_long};

pub fn run(file: &str, sheet: &str, output: Option<String>, format: OutputFormat) -> Result<()> {
    let input = PathBuf::from(file);
    let raw = read_table(&input, sheet)?;
    let wide = load_wide(&raw)?;
    let long = melt(&wide);

    let back = pivot_long(&long);
    if (back.total_ytd() - wide.total_ytd()).abs() > 1e-6 {
        warn!(wide = wide.total_ytd(), long = back.total_ytd(), "long form total differs from input");
    } else {
        debug!(total = back.total_ytd(), "long form matches input total");
    }

    let output = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(&input, "long", format));
    write_file(&output, |w| write_long(&long, format, w))?;
    println!(
        "{} rows x {} months -> {} rows written to {}",
        wide.rows.len(),
        wide.months.len(),
        long.rows.len(),
        output.display()
    );
    Ok(())
}
