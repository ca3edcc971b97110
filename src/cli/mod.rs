pub mod classify;
pub mod melt;
pub mod rules;
pub mod summary;
pub mod transform;

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::exporter::OutputFormat;
use crate::settings::{resolve_settings, Settings};

#[derive(Parser)]
#[command(
    name = "kontierung",
    about = "Classify SAP timesheet exports and pivot them into monthly YTD tables."
)]
pub struct Cli {
    /// Settings file (default: ~/.config/kontierung/settings.json)
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags that override the engine part of the settings file.
#[derive(Args, Clone, Default)]
pub struct EngineArgs {
    /// Rule set: basic, absence or split
    #[arg(long = "rule-version")]
    pub rule_version: Option<String>,
    /// Worksheet to read from spreadsheet inputs
    #[arg(long)]
    pub sheet: Option<String>,
    /// Date format for text dates (chrono syntax)
    #[arg(long = "date-format")]
    pub date_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify and pivot a raw export into the wide monthly table.
    Transform {
        /// Raw export (XLSX/XLS/CSV)
        file: String,
        /// Output path (default: <input>_transformed.<ext>)
        #[arg(long)]
        output: Option<String>,
        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,
        /// Emit all twelve month columns, even empty ones
        #[arg(long = "all-months")]
        all_months: bool,
        /// Also write the long form next to the wide output
        #[arg(long)]
        long: bool,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Reshape a transformed wide table into long form (one row per month).
    Melt {
        /// Wide table produced by `transform` (all twelve months required)
        file: String,
        /// Output path (default: <input>_long.<ext>)
        #[arg(long)]
        output: Option<String>,
        #[arg(long, value_enum, default_value = "csv")]
        format: OutputFormat,
        /// Worksheet to read from spreadsheet inputs
        #[arg(long)]
        sheet: Option<String>,
    },
    /// Transform a raw export and print category/month totals.
    Summary {
        /// Raw export (XLSX/XLS/CSV)
        file: String,
        /// Number of subcategories to list
        #[arg(long, default_value = "10")]
        top: usize,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Show the ordered classification rules in effect.
    Rules {
        /// Rule set: basic, absence or split
        #[arg(long = "rule-version")]
        rule_version: Option<String>,
        /// Print as JSON (suitable for the settings file)
        #[arg(long)]
        json: bool,
        /// Write the resolved settings to the settings file
        #[arg(long)]
        save: bool,
    },
    /// Classify a single record given on the command line.
    Classify(ClassifyArgs),
}

#[derive(Args, Clone, Default)]
pub struct ClassifyArgs {
    /// Kontierungsbeschreibung
    #[arg(long, default_value = "")]
    pub description: String,
    /// Kontierungstyp
    #[arg(long = "booking-type", default_value = "")]
    pub booking_type: String,
    /// Kontierungsnummer
    #[arg(long, default_value = "")]
    pub reference: String,
    /// Leistung Kurztext
    #[arg(long = "short-text", default_value = "")]
    pub short_text: String,
    /// Leistungsart
    #[arg(long = "service-type", default_value = "")]
    pub service_type: String,
    /// Projektdefinition
    #[arg(long)]
    pub project: Option<String>,
    /// Lohnart-Langtext
    #[arg(long = "wage-type", default_value = "")]
    pub wage_type: String,
    /// Ab-/Anwesenheitsart code
    #[arg(long, default_value = "")]
    pub attendance: String,
    /// Rule set: basic, absence or split
    #[arg(long = "rule-version")]
    pub rule_version: Option<String>,
}

/// Settings file merged with command-line overrides.
pub(crate) fn settings_with(config: Option<&str>, engine: &EngineArgs) -> Result<Settings> {
    let mut settings = resolve_settings(config)?;
    if let Some(version) = &engine.rule_version {
        settings.rule_version = version.parse()?;
        settings.rules = None;
    }
    if let Some(sheet) = &engine.sheet {
        settings.sheet_name = sheet.clone();
    }
    if let Some(format) = &engine.date_format {
        settings.date_format = format.clone();
    }
    Ok(settings)
}
