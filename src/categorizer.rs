use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KontierungError;
use crate::lookups::LookupTables;
use crate::models::{Category, RawRecord, UNKNOWN};

pub const UNKNOWN_REFERENCE: &str = "Unbekannte Kontierungsnummer";
pub const UNKNOWN_KEYWORD: &str = "XXX";

const ICT_PREFIX: &str = "PP-UHR ICT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSet {
    Ict,
    Flbw,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    DescriptionStartsWith { text: String },
    DescriptionContains { text: String },
    ReferenceIn { set: ReferenceSet },
    BookingTypeContains { text: String },
    WageTypePresent,
    /// Service type is a work type and the attendance code maps to `present`.
    Attendance { present: bool },
}

impl Predicate {
    fn matches(&self, record: &RawRecord, tables: &LookupTables) -> bool {
        match self {
            Self::DescriptionStartsWith { text } => record.description().starts_with(text.as_str()),
            Self::DescriptionContains { text } => record.description().contains(text.as_str()),
            Self::ReferenceIn { set: ReferenceSet::Ict } => tables.is_ict_order(record.reference()),
            Self::ReferenceIn { set: ReferenceSet::Flbw } => tables.is_flbw_order(record.reference()),
            Self::BookingTypeContains { text } => record.booking_type().contains(text.as_str()),
            Self::WageTypePresent => !record.wage_type().trim().is_empty(),
            Self::Attendance { present } => {
                let service_type = record.service_type.as_deref().unwrap_or("");
                if !tables.is_work_type(service_type) {
                    return false;
                }
                tables
                    .absence(record.attendance())
                    .map_or(false, |code| code.present == *present)
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::DescriptionStartsWith { text } => format!("Kontierungsbeschreibung beginnt mit \"{text}\""),
            Self::DescriptionContains { text } => format!("Kontierungsbeschreibung enthält \"{text}\""),
            Self::ReferenceIn { set: ReferenceSet::Ict } => "Kontierungsnummer in ICT-Auftragsliste".to_string(),
            Self::ReferenceIn { set: ReferenceSet::Flbw } => "Kontierungsnummer in FLBW-Auftragsliste".to_string(),
            Self::BookingTypeContains { text } => format!("Kontierungstyp enthält \"{text}\""),
            Self::WageTypePresent => "Lohnart-Langtext gesetzt".to_string(),
            Self::Attendance { present: true } => "Leistungsart relevant, Code anwesend".to_string(),
            Self::Attendance { present: false } => "Leistungsart relevant, Code abwesend".to_string(),
        }
    }
}

/// A rule matches when any of its predicates match. No predicates: always matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub category: Category,
    #[serde(default)]
    pub when: Vec<Predicate>,
}

impl Rule {
    pub fn matches(&self, record: &RawRecord, tables: &LookupTables) -> bool {
        self.when.is_empty() || self.when.iter().any(|p| p.matches(record, tables))
    }

    pub fn describe(&self) -> String {
        if self.when.is_empty() {
            return "immer".to_string();
        }
        self.when
            .iter()
            .map(Predicate::describe)
            .collect::<Vec<_>>()
            .join(" ODER ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleVersion {
    #[default]
    Basic,
    Absence,
    Split,
}

impl RuleVersion {
    pub const ALL: [RuleVersion; 3] = [Self::Basic, Self::Absence, Self::Split];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Absence => "absence",
            Self::Split => "split",
        }
    }

    pub fn rules(&self) -> Vec<Rule> {
        let mut rules = vec![
            Rule {
                category: Category::Ict,
                when: vec![
                    Predicate::DescriptionStartsWith { text: ICT_PREFIX.to_string() },
                    Predicate::ReferenceIn { set: ReferenceSet::Ict },
                ],
            },
            Rule {
                category: Category::Flbw,
                when: vec![
                    Predicate::DescriptionContains { text: "FLBW".to_string() },
                    Predicate::ReferenceIn { set: ReferenceSet::Flbw },
                ],
            },
            Rule {
                category: Category::Psp,
                when: vec![Predicate::BookingTypeContains { text: "PSP".to_string() }],
            },
        ];
        if matches!(self, Self::Absence | Self::Split) {
            rules.push(Rule {
                category: Category::Anwesenheit,
                when: vec![Predicate::WageTypePresent],
            });
        }
        if matches!(self, Self::Split) {
            rules.push(Rule {
                category: Category::Arbeitsleistung,
                when: vec![Predicate::Attendance { present: true }],
            });
            rules.push(Rule {
                category: Category::Abwesenheit,
                when: vec![Predicate::Attendance { present: false }],
            });
        }
        rules.push(Rule {
            category: Category::Anderes,
            when: vec![],
        });
        rules
    }
}

impl FromStr for RuleVersion {
    type Err = KontierungError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|v| v.key().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| KontierungError::UnknownRuleVersion(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: Category,
    pub subcategory: String,
    pub subcategory_name: String,
}

/// First matching rule wins; falls back to `Anderes` if nothing matches.
pub fn resolve_category(record: &RawRecord, tables: &LookupTables, rules: &[Rule]) -> Category {
    rules
        .iter()
        .find(|rule| rule.matches(record, tables))
        .map_or(Category::Anderes, |rule| rule.category)
}

pub fn classify(record: &RawRecord, tables: &LookupTables, rules: &[Rule]) -> Classification {
    let category = resolve_category(record, tables, rules);
    let subcategory = match category {
        Category::Ict => extract_number(record.reference(), 8),
        Category::Flbw => find_keyword(
            record.service_short_text.as_deref().unwrap_or(""),
            &tables.flbw_keywords,
        ),
        Category::Psp => extract_number(record.reference(), 7),
        c if c.is_attendance_related() => record
            .booking_description
            .clone()
            .unwrap_or_else(|| UNKNOWN.to_string()),
        _ => String::new(),
    };
    let subcategory_name = if category == Category::Psp {
        let project = record.project_definition.as_deref().unwrap_or(UNKNOWN);
        format!("{subcategory} {project}")
    } else {
        subcategory.clone()
    };
    Classification {
        category,
        subcategory,
        subcategory_name,
    }
}

/// Pull an `n`-digit number out of free text.
///
/// Digit runs are scanned in order. The first run of exactly `n` digits wins;
/// failing that, the first longer run contributes its trailing `n` digits.
pub fn extract_number(text: &str, n: usize) -> String {
    let runs = digit_runs(text);
    if let Some(exact) = runs.iter().find(|r| r.len() == n) {
        return exact.to_string();
    }
    if let Some(longer) = runs.iter().find(|r| r.len() > n) {
        return longer[longer.len() - n..].to_string();
    }
    UNKNOWN_REFERENCE.to_string()
}

fn digit_runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_ascii_digit(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(&text[s..i]);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(&text[s..]);
    }
    runs
}

/// Prefix match only: "ABW..." matches ABW, "XABW" does not.
pub fn find_keyword(text: &str, keywords: &[String]) -> String {
    let upper = text.trim().to_uppercase();
    keywords
        .iter()
        .find(|kw| upper.starts_with(kw.to_uppercase().as_str()))
        .cloned()
        .unwrap_or_else(|| UNKNOWN_KEYWORD.to_string())
}
