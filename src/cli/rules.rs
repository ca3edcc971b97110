use std::path::Path;

use comfy_table::{Cell, Table};

use crate::categorizer::Rule;
use crate::error::Result;
use crate::settings::{save_settings, Settings};

/// Print the rules in effect. With `save_to`, also persist the resolved settings there.
pub fn run(settings: &Settings, json: bool, save_to: Option<&Path>) -> Result<()> {
    if let Some(path) = save_to {
        save_settings(settings, path)?;
        println!("Saved settings to {}", path.display());
    }
    let rules = settings.active_rules();
    if json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }
    let source = if settings.rules.is_some() {
        "custom".to_string()
    } else {
        settings.rule_version.key().to_string()
    };
    println!("Rules ({source}), first match wins\n{}", rules_table(&rules));
    Ok(())
}

fn rules_table(rules: &[Rule]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Kategorie", "Bedingung"]);
    for (i, rule) in rules.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(rule.category),
            Cell::new(rule.describe()),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorizer::RuleVersion;

    #[test]
    fn test_run_saves_selected_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            rule_version: RuleVersion::Absence,
            ..Settings::default()
        };
        run(&settings, true, Some(path.as_path())).unwrap();
        let saved = crate::settings::load_settings_from(&path).unwrap();
        assert_eq!(saved.rule_version, RuleVersion::Absence);
    }

    #[test]
    fn test_rules_table_lists_fallback_last() {
        let out = rules_table(&RuleVersion::Split.rules()).to_string();
        assert!(out.contains("Arbeitsleistung"));
        assert!(out.contains("immer"));
        let ict = out.find("ICT").unwrap();
        let other = out.find("Anderes").unwrap();
        assert!(ict < other);
    }
}
