use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder substituted for missing grouping-key values.
pub const UNKNOWN: &str = "Unbekannt";

/// A single spreadsheet or CSV cell before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

/// An already-parsed input sheet: one header row plus data rows.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// One row of the timesheet export after column mapping and type coercion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub org_unit: Option<String>,
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
    pub booking_date: Option<NaiveDate>,
    pub booking_description: Option<String>,
    pub booking_type: Option<String>,
    pub booking_reference: Option<String>,
    pub service_short_text: Option<String>,
    pub service_type: Option<String>,
    pub receiving_cost_center: Option<String>,
    pub project_definition: Option<String>,
    pub wage_type_long_text: Option<String>,
    pub amount: f64,
    pub attendance_text: Option<String>,
}

impl RawRecord {
    pub fn description(&self) -> &str {
        self.booking_description.as_deref().unwrap_or("")
    }

    pub fn reference(&self) -> &str {
        self.booking_reference.as_deref().unwrap_or("")
    }

    pub fn booking_type(&self) -> &str {
        self.booking_type.as_deref().unwrap_or("")
    }

    pub fn wage_type(&self) -> &str {
        self.wage_type_long_text.as_deref().unwrap_or("")
    }

    pub fn attendance(&self) -> &str {
        self.attendance_text.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "ICT")]
    Ict,
    #[serde(rename = "FLBW")]
    Flbw,
    #[serde(rename = "PSP")]
    Psp,
    Anwesenheit,
    Arbeitsleistung,
    Abwesenheit,
    Anderes,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::Ict,
        Self::Flbw,
        Self::Psp,
        Self::Anwesenheit,
        Self::Arbeitsleistung,
        Self::Abwesenheit,
        Self::Anderes,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ict => "ICT",
            Self::Flbw => "FLBW",
            Self::Psp => "PSP",
            Self::Anwesenheit => "Anwesenheit",
            Self::Arbeitsleistung => "Arbeitsleistung",
            Self::Abwesenheit => "Abwesenheit",
            Self::Anderes => "Anderes",
        }
    }

    /// Categories whose subcategory is the booking description itself.
    pub fn is_attendance_related(&self) -> bool {
        matches!(self, Self::Anwesenheit | Self::Arbeitsleistung | Self::Abwesenheit)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    ArbeitUnproduktiv,
    Arbeit,
    Abwesend,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ArbeitUnproduktiv => "Arbeit Unproduktiv",
            Self::Arbeit => "Arbeit",
            Self::Abwesend => "Abwesend",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Calendar month bucket. Variant order is the canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    Januar,
    Februar,
    Maerz,
    April,
    Mai,
    Juni,
    Juli,
    August,
    September,
    Oktober,
    November,
    Dezember,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Self::Januar,
        Self::Februar,
        Self::Maerz,
        Self::April,
        Self::Mai,
        Self::Juni,
        Self::Juli,
        Self::August,
        Self::September,
        Self::Oktober,
        Self::November,
        Self::Dezember,
    ];

    /// 1-based month number.
    pub fn number(&self) -> u32 {
        *self as u32 + 1
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Januar => "Januar",
            Self::Februar => "Februar",
            Self::Maerz => "März",
            Self::April => "April",
            Self::Mai => "Mai",
            Self::Juni => "Juni",
            Self::Juli => "Juli",
            Self::August => "August",
            Self::September => "September",
            Self::Oktober => "Oktober",
            Self::November => "November",
            Self::Dezember => "Dezember",
        }
    }

    pub fn of_date(date: &NaiveDate) -> Month {
        use chrono::Datelike;
        Self::ALL[date.month0() as usize]
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A raw record after classification. `record.attendance_text` holds the
/// resolved status label; the raw attendance code is discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub record: RawRecord,
    pub status: Status,
    pub category: Category,
    pub subcategory: String,
    pub subcategory_name: String,
}

/// Output headers of the grouping key, in column order.
pub const KEY_HEADERS: [&str; 15] = [
    "Organisationseinheit",
    "U-Nummer",
    "Name",
    "Kontierungsbeschreibung",
    "Kontierungstyp",
    "Kontierungsnummer",
    "Leistung Kurztext",
    "Leistungsart",
    "EmpfKostenstelle",
    "Projektdefinition",
    "Lohnart-Langtext",
    "Status",
    "Kategorie",
    "Unterkategorie",
    "Unterkategorie Name",
];

pub const YTD_HEADER: &str = "ytd";

/// One wide row: key values, one amount per month, and the YTD total.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    pub key: Vec<String>,
    pub values: [f64; 12],
    pub ytd: f64,
}

impl AggregatedRow {
    pub fn value(&self, month: Month) -> f64 {
        self.values[month.index()]
    }

    pub fn key_value(&self, key_headers: &[String], header: &str) -> Option<&str> {
        key_headers
            .iter()
            .position(|h| h == header)
            .and_then(|i| self.key.get(i))
            .map(String::as_str)
    }
}

/// Wide-form table. `months` lists the emitted month columns in calendar order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PivotTable {
    pub key_headers: Vec<String>,
    pub months: Vec<Month>,
    pub rows: Vec<AggregatedRow>,
}

impl PivotTable {
    pub fn headers(&self) -> Vec<String> {
        let mut headers = self.key_headers.clone();
        headers.extend(self.months.iter().map(|m| m.label().to_string()));
        headers.push(YTD_HEADER.to_string());
        headers
    }

    /// Recompute each row's YTD from the emitted month columns.
    pub fn recompute_ytd(&mut self) {
        for row in &mut self.rows {
            row.ytd = self.months.iter().map(|m| row.values[m.index()]).sum();
        }
    }

    pub fn total_ytd(&self) -> f64 {
        self.rows.iter().map(|r| r.ytd).sum()
    }
}

/// Long-form row: one (entity, month) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub key: Vec<String>,
    pub month: Month,
    pub value: f64,
}

impl LongRow {
    /// Explicit sort key for time series consumers (1 = Januar).
    pub fn month_order(&self) -> u32 {
        self.month.number()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LongTable {
    pub key_headers: Vec<String>,
    pub rows: Vec<LongRow>,
}
