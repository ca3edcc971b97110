use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::categorizer::{Rule, RuleVersion};
use crate::error::{KontierungError, Result};
use crate::importer::DEFAULT_SHEET;
use crate::lookups::LookupTables;
use crate::normalizer::DEFAULT_DATE_FORMAT;
use crate::pipeline::EngineConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub rule_version: RuleVersion,
    /// Replaces the version's rule list entirely when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default)]
    pub all_months: bool,
    #[serde(default)]
    pub lookups: LookupTables,
}

fn default_sheet_name() -> String {
    DEFAULT_SHEET.to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rule_version: RuleVersion::default(),
            rules: None,
            sheet_name: default_sheet_name(),
            date_format: default_date_format(),
            all_months: false,
            lookups: LookupTables::default(),
        }
    }
}

impl Settings {
    pub fn active_rules(&self) -> Vec<Rule> {
        self.rules
            .clone()
            .unwrap_or_else(|| self.rule_version.rules())
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            tables: self.lookups.clone(),
            rules: self.active_rules(),
            date_format: self.date_format.clone(),
            all_months: self.all_months,
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("kontierung")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Settings from the default location; a missing or unreadable file yields defaults.
pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings");
            Settings::default()
        })
    } else {
        Settings::default()
    }
}

/// Settings from an explicit file. Errors propagate.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| KontierungError::Settings(format!("{}: {e}", path.display())))
}

pub fn resolve_settings(config: Option<&str>) -> Result<Settings> {
    match config {
        Some(path) => load_settings_from(Path::new(path)),
        None => Ok(load_settings()),
    }
}

pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| KontierungError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}
