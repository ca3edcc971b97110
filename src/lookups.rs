//! Static lookup data for the classifier.
//!
//! Everything here is plain data. `LookupTables::default()` carries the
//! built-in tables; settings may replace any of them wholesale.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceCode {
    pub label: String,
    /// `true` when the code counts as time at work.
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupTables {
    pub ict_order_numbers: BTreeSet<String>,
    pub flbw_order_numbers: BTreeSet<String>,
    /// Ordered: the first matching prefix wins.
    pub flbw_keywords: Vec<String>,
    pub work_types: BTreeSet<String>,
    pub absence_codes: BTreeMap<String, AbsenceCode>,
}

impl Default for LookupTables {
    fn default() -> Self {
        Self {
            ict_order_numbers: to_set(ICT_ORDER_NUMBERS),
            flbw_order_numbers: BTreeSet::new(),
            flbw_keywords: FLBW_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            work_types: to_set(WORK_TYPES),
            absence_codes: ABSENCE_CODES
                .iter()
                .map(|(code, label, present)| {
                    (
                        code.to_string(),
                        AbsenceCode {
                            label: label.to_string(),
                            present: *present,
                        },
                    )
                })
                .collect(),
        }
    }
}

impl LookupTables {
    pub fn absence(&self, code: &str) -> Option<&AbsenceCode> {
        self.absence_codes.get(code.trim())
    }

    pub fn is_ict_order(&self, reference: &str) -> bool {
        self.ict_order_numbers.contains(reference.trim())
    }

    pub fn is_flbw_order(&self, reference: &str) -> bool {
        self.flbw_order_numbers.contains(reference.trim())
    }

    pub fn is_work_type(&self, service_type: &str) -> bool {
        self.work_types.contains(service_type.trim())
    }
}

fn to_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const ICT_ORDER_NUMBERS: &[&str] = &[
    "170232862", "170232863", "170232864", "170232865", "170232866",
    "170232867", "170232869", "170233584", "170423823", "170423824",
    "170423825", "170423826", "170423827", "170423828", "170423829",
    "170424380", "170424465", "170424663",
];

const FLBW_KEYWORDS: &[&str] = &[
    "ABW", "ÄAUF", "EINK", "INNO", "IHE", "MFK", "MDBI", "MON", "NORM",
    "OBS", "RCM", "REST", "SICH", "STADA", "STUD", "SUE", "SYM", "PSUP",
    "PROD", "IND", "MDG", "ANA", "INST", "ADM", "KURE", "CLR", "CAD", "IHS",
];

const WORK_TYPES: &[&str] = &["Anwesenheit", "Abwesenheit", "Arbeitszeit"];

// (code, label, present)
const ABSENCE_CODES: &[(&str, &str, bool)] = &[
    ("", "SITZ, Sitzungen", true),
    ("1", "Pikettdienst 1 streng", false),
    ("2", "Pikettdienst 2 normal", false),
    ("3", "Pikettdienst 3 leicht", false),
    ("5", "Pikett Mittel", false),
    ("9", "Kasernierung", false),
    ("100", "Ferien", false),
    ("110", "Treueprämie (Zeit)", false),
    ("200", "Krankheit", false),
    ("201", "Krank teilarbeitsfähig", false),
    ("210", "Krankheit (Militär)", false),
    ("211", "K (Mil) teilarbeitsfähig", false),
    ("300", "Militär / Zivilschutz", false),
    ("400", "Unfall (NBU)", false),
    ("401", "NBU teilarbeitsfähig", false),
    ("405", "Unfall (BU)", false),
    ("406", "BU teilarbeitsfähig", false),
    ("410", "Unfall (Militär)", false),
    ("411", "Unfall (Mil) teilarbeit", false),
    ("800", "Komp. Pikett", false),
    ("900", "Komp. Überzeit 1", false),
    ("920", "Komp. Nachtdienst 3", false),
    ("925", "Komp. Gleitzeit", false),
    ("940", "Überzeit", false),
    ("950", "Seminar / Kurs", true),
    ("960", "Reisezeitgutschrift", true),
    ("970", "Freistellung PeKo", false),
    ("1120", "Auszeit in Tagen", false),
    ("1140", "Ind. Bez. Urlaub IBU", false),
    ("2000", "Arbeitszeit", true),
    ("2002", "BBD", true),
    ("2003", "BBD Überzeit 1", true),
    ("2004", "BBD Nachtdienst 3", true),
    ("2070", "Piketteinsatz", true),
    ("2090", "Kasernierung Überzeit", true),
    ("2100", "Pause AZG auswärts", true),
    ("2110", "Pause / Nachtzu / ArbOrt", true),
    ("2201", "Schichtlage ArG", true),
    ("2202", "Schichtlage AZG", true),
    ("2270", "Arbeitsunterbrechung", true),
    ("8710", "Weiterbildungsurlaub", false),
    ("8712", "ausserschul. Jugendarbeit", false),
    ("8713", "Arbeitsenthebung", false),
    ("8714", "Freistetzung", false),
    ("8715", "Mutterschutz", false),
    ("8716", "Adoptionsurlaub", false),
    ("8717", "Urlaub Berufsbildung", false),
    ("8719", "Untersuch SUVA", false),
    ("875A", "Hochzeit", false),
    ("875C", "Tod Ehegatte, Eltern, Kind", false),
    ("875D", "Tod SchEltern, Geschwister", false),
    ("875E", "Tod GrEltern, UrGrEltern", false),
    ("875F", "Familiäre Gründe", false),
    ("875G", "Pflege der Kinder", false),
    ("875H", "Stellenbewerbungen", false),
    ("875I", "Wohnungswechsel", false),
    ("875J", "Vorsprache b. Behörden", false),
    ("875K", "Ausübung öffentl. Ämter", false),
    ("875L", "Arbeitsjubiläum", false),
    ("875M", "Entlassung Wehrpflicht", false),
    ("875N", "Vaterschaftsurlaub", false),
    ("876A", "Feuerwehr / Einsatz b. Alarm", false),
    ("876B", "Feuerwehr / Kurs", false),
    ("876C", "Aktiver Spitzensport", false),
    ("876D", "Ltg. Behindertensport", false),
    ("876E", "Wohnungssuche", false),
    ("876F", "1. Mai Veranstaltungen", false),
    ("876G", "Bild. Veranstaltung Gewerksch.", false),
    ("876H", "Freiwilliger Zivilschutz", false),
    ("876I", "Jugend u. Sport", false),
    ("877A", "Urlaubsscheck 1/1", false),
    ("877B", "Urlaubsscheck 1/2", false),
    ("878A", "Mutterschaftsurlaub", false),
    ("879A", "Erziehungsurlaub", false),
    ("879B", "Gestzl. Betr. Urlaub Kind", false),
];
