use std::sync::OnceLock;

use regex::Regex;

use crate::models::{RawRecord, Status};

fn is_work_code(code: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^2\d{3}$").ok())
        .as_ref()
        .map_or(false, |re| re.is_match(code))
}

/// Wage-type override beats the attendance code; 2xxx codes count as work.
pub fn resolve_status(record: &RawRecord) -> Status {
    if !record.wage_type().trim().is_empty() {
        return Status::ArbeitUnproduktiv;
    }
    if is_work_code(record.attendance().trim()) {
        return Status::Arbeit;
    }
    Status::Abwesend
}
