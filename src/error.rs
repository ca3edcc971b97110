use thiserror::Error;

#[derive(Error, Debug)]
pub enum KontierungError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Missing month columns: {}", .0.join(", "))]
    MissingMonthColumns(Vec<String>),

    #[error("Unknown rule version: {0} (expected basic, absence or split)")]
    UnknownRuleVersion(String),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, KontierungError>;
