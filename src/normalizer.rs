use chrono::NaiveDate;
use tracing::debug;

use crate::error::{KontierungError, Result};
use crate::models::{Cell, RawRecord, RawTable};

pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    OrgUnit,
    EmployeeId,
    EmployeeName,
    BookingDate,
    BookingDescription,
    BookingType,
    BookingReference,
    ServiceShortText,
    ServiceType,
    ReceivingCostCenter,
    ProjectDefinition,
    WageTypeLongText,
    Amount,
    AttendanceText,
}

/// (field, header in the SAP export, header in transformed output)
pub const COLUMNS: [(Field, &str, &str); 14] = [
    (Field::OrgUnit, "OE", "Organisationseinheit"),
    (Field::EmployeeId, "Personalnummer", "U-Nummer"),
    (Field::EmployeeName, "Name des Mitarbeiters bzw. Bewerbers", "Name"),
    (Field::BookingDate, "Datum", "Datum"),
    (Field::BookingDescription, "Kontierungstext", "Kontierungsbeschreibung"),
    (Field::BookingType, "Kontierung (Empf.)", "Kontierungstyp"),
    (Field::BookingReference, "Allgemeiner Empfänger", "Kontierungsnummer"),
    (Field::ServiceShortText, "Kurztext", "Leistung Kurztext"),
    (Field::ServiceType, "Leistungsart", "Leistungsart"),
    (Field::ReceivingCostCenter, "EmpfKostenstelle", "EmpfKostenstelle"),
    (Field::ProjectDefinition, "Empfänger-PSP-Element", "Projektdefinition"),
    (Field::WageTypeLongText, "Lohnart-Langtext", "Lohnart-Langtext"),
    (Field::Amount, "Anzahl (Maßeinheit)", "Betrag"),
    (Field::AttendanceText, "Ab-/Anwesenheitsart", "Abwesenheitsart"),
];

/// Column index per entry of `COLUMNS`. Fails listing every missing column.
pub fn resolve_columns(headers: &[String]) -> Result<[usize; 14]> {
    let mut indexes = [0usize; 14];
    let mut missing = Vec::new();
    for (slot, (field, source, canonical)) in COLUMNS.iter().enumerate() {
        let found = headers
            .iter()
            .position(|h| h.trim() == *source)
            .or_else(|| headers.iter().position(|h| h.trim() == *canonical));
        match found {
            Some(i) => {
                debug!(?field, column = i, "mapped column");
                indexes[slot] = i;
            }
            None => missing.push(source.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(KontierungError::MissingColumns(missing));
    }
    Ok(indexes)
}

pub fn normalize(table: &RawTable, date_format: &str) -> Result<Vec<RawRecord>> {
    let indexes = resolve_columns(&table.headers)?;
    let empty = Cell::Empty;
    let records = table
        .rows
        .iter()
        .map(|row| {
            let cell = |field: Field| -> &Cell {
                let slot = COLUMNS.iter().position(|(f, _, _)| *f == field).unwrap_or(0);
                row.get(indexes[slot]).unwrap_or(&empty)
            };
            let text = |field: Field| cell_to_string(cell(field));
            RawRecord {
                org_unit: text(Field::OrgUnit),
                employee_id: text(Field::EmployeeId),
                employee_name: text(Field::EmployeeName),
                booking_date: cell_to_date(cell(Field::BookingDate), date_format),
                booking_description: text(Field::BookingDescription),
                booking_type: text(Field::BookingType),
                booking_reference: text(Field::BookingReference),
                service_short_text: text(Field::ServiceShortText),
                service_type: text(Field::ServiceType),
                receiving_cost_center: text(Field::ReceivingCostCenter),
                project_definition: text(Field::ProjectDefinition),
                wage_type_long_text: text(Field::WageTypeLongText),
                amount: cell_to_amount(cell(Field::Amount)),
                attendance_text: text(Field::AttendanceText),
            }
        })
        .collect();
    Ok(records)
}

/// Identifier-safe string form of a cell: whole numbers lose their `.0`.
pub fn cell_to_string(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Empty => None,
        Cell::Text(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Cell::Number(f) if !f.is_finite() => None,
        Cell::Number(f) => Some(format_number_id(*f)),
        Cell::Date(d) => Some(d.format(DEFAULT_DATE_FORMAT).to_string()),
    }
}

fn format_number_id(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

pub fn cell_to_date(cell: &Cell, date_format: &str) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Number(serial) => excel_serial_to_date(*serial),
        Cell::Text(s) => parse_date(s, date_format),
        Cell::Empty => None,
    }
}

pub fn parse_date(raw: &str, date_format: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, date_format)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

/// Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug).
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..3_000_000.0).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial.trunc() as i64))
}

pub fn cell_to_amount(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(f) if f.is_finite() => *f,
        Cell::Text(s) => parse_amount(s),
        _ => 0.0,
    }
}

pub fn parse_amount(raw: &str) -> f64 {
    let s: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}' | ' '))
        .collect();
    // With both separators present, the last one is the decimal point.
    let s = match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (None, Some(_)) if s.matches(',').count() == 1 => s.replace(',', "."),
        _ => s,
    };
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn source_headers() -> Vec<String> {
        COLUMNS.iter().map(|(_, source, _)| source.to_string()).collect()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("8.5"), 8.5);
        assert_eq!(parse_amount(" 8,25 "), 8.25);
        assert_eq!(parse_amount("1'234.50"), 1234.5);
        assert_eq!(parse_amount("1,234.50"), 1234.5);
        assert_eq!(parse_amount("1.234,50"), 1234.5);
        assert_eq!(parse_amount("1.234.567,5"), 1234567.5);
        assert_eq!(parse_amount("1,2.3,4"), 0.0);
        assert_eq!(parse_amount("1,234,567"), 0.0);
        assert_eq!(parse_amount("-2"), -2.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("NaN"), 0.0);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("15.01.2025", DEFAULT_DATE_FORMAT), NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(parse_date("2025-02-03", DEFAULT_DATE_FORMAT), NaiveDate::from_ymd_opt(2025, 2, 3));
        assert_eq!(parse_date("31.02.2025", DEFAULT_DATE_FORMAT), None);
        assert_eq!(parse_date("gestern", DEFAULT_DATE_FORMAT), None);
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(excel_serial_to_date(45667.75), NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(excel_serial_to_date(-3.0), None);
    }

    #[test]
    fn test_numeric_ids_keep_string_form() {
        assert_eq!(cell_to_string(&Cell::Number(12345.0)), Some("12345".to_string()));
        assert_eq!(cell_to_string(&Cell::Number(170232862.0)), Some("170232862".to_string()));
        assert_eq!(cell_to_string(&Cell::Number(1.5)), Some("1.5".to_string()));
        assert_eq!(cell_to_string(&text("  0042 ")), Some("0042".to_string()));
        assert_eq!(cell_to_string(&text("   ")), None);
        assert_eq!(cell_to_string(&Cell::Empty), None);
    }

    #[test]
    fn test_resolve_columns_accepts_both_header_styles() {
        assert!(resolve_columns(&source_headers()).is_ok());
        let canonical: Vec<String> = COLUMNS.iter().map(|(_, _, c)| c.to_string()).collect();
        assert!(resolve_columns(&canonical).is_ok());
    }

    #[test]
    fn test_resolve_columns_lists_all_missing() {
        let headers: Vec<String> = source_headers()
            .into_iter()
            .filter(|h| h != "OE" && h != "Datum")
            .collect();
        match resolve_columns(&headers) {
            Err(KontierungError::MissingColumns(missing)) => {
                assert_eq!(missing, vec!["OE".to_string(), "Datum".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_row() {
        let mut headers = source_headers();
        headers.reverse();
        let mut row = vec![
            text("OE-1"),
            Cell::Number(4711.0),
            text("Muster Hans"),
            text("15.03.2025"),
            text("PP-UHR ICT Support"),
            text("Auftrag"),
            Cell::Number(170232862.0),
            text("MON Montage"),
            text("Operation"),
            Cell::Number(80012345.0),
            Cell::Empty,
            Cell::Empty,
            text("7,5"),
            text(" 2000 "),
        ];
        row.reverse();
        let table = RawTable { headers, rows: vec![row] };
        let records = normalize(&table, DEFAULT_DATE_FORMAT).unwrap();
        let r = &records[0];
        assert_eq!(r.org_unit.as_deref(), Some("OE-1"));
        assert_eq!(r.employee_id.as_deref(), Some("4711"));
        assert_eq!(r.booking_date, NaiveDate::from_ymd_opt(2025, 3, 15));
        assert_eq!(r.booking_reference.as_deref(), Some("170232862"));
        assert_eq!(r.receiving_cost_center.as_deref(), Some("80012345"));
        assert_eq!(r.project_definition, None);
        assert_eq!(r.amount, 7.5);
        assert_eq!(r.attendance_text.as_deref(), Some("2000"));
    }

    #[test]
    fn test_normalize_short_row_pads_missing_cells() {
        let table = RawTable {
            headers: source_headers(),
            rows: vec![vec![text("OE-1")]],
        };
        let records = normalize(&table, DEFAULT_DATE_FORMAT).unwrap();
        assert_eq!(records[0].org_unit.as_deref(), Some("OE-1"));
        assert_eq!(records[0].booking_date, None);
        assert_eq!(records[0].amount, 0.0);
    }
}
