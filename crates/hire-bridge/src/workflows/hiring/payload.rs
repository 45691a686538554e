//! Mapping a hire event onto a BambooHR employee record.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rand::Rng;

use super::domain::HireEvent;
use crate::config::HiringConfig;
use crate::integrations::bamboohr::EmployeeRecord;
use crate::integrations::teamtailor::RequisitionAttributes;

const EMAIL_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Build the employee payload. `today` backs up a missing or malformed hire
/// date; `rng` only matters in test mode.
pub fn build_employee<R: Rng + ?Sized>(
    event: &HireEvent,
    requisition: &RequisitionAttributes,
    department: Option<&str>,
    hiring: &HiringConfig,
    today: NaiveDate,
    rng: &mut R,
) -> EmployeeRecord {
    let candidate = &event.candidate;
    let first_name = non_empty(candidate.first_name.as_deref()).unwrap_or_default();

    let (first_name, work_email) = if hiring.test_mode {
        (format!("TEST_{first_name}"), test_email(rng))
    } else {
        (
            first_name.to_string(),
            non_empty(candidate.email.as_deref())
                .unwrap_or_default()
                .to_string(),
        )
    };

    let hire_date = non_empty(candidate.updated_at.as_deref())
        .or_else(|| non_empty(event.updated_at.as_deref()))
        .and_then(parse_hire_date)
        .unwrap_or(today);

    EmployeeRecord {
        first_name,
        last_name: non_empty(candidate.last_name.as_deref())
            .unwrap_or_default()
            .to_string(),
        work_email,
        hire_date: hire_date.format("%Y-%m-%d").to_string(),
        job_title: job_title(event, requisition),
        employment_history_status: "Full-Time".to_string(),
        pay_type: "Salary".to_string(),
        pay_per: "Year".to_string(),
        exempt: "Exempt".to_string(),
        location: hiring.default_location.clone(),
        department: non_empty(department).map(str::to_string),
        division: requisition.answer("team"),
        mobile_phone: non_empty(candidate.phone.as_deref()).map(str::to_string),
        pay_rate: None,
    }
}

/// `"{level} {title}"` when the requisition records a candidate level.
fn job_title(event: &HireEvent, requisition: &RequisitionAttributes) -> String {
    let title = non_empty(event.job_title.as_deref())
        .or_else(|| non_empty(requisition.job_title.as_deref()))
        .unwrap_or_default();

    match requisition.answer("level_of_candidate") {
        Some(level) if !title.is_empty() => format!("{level} {title}").trim().to_string(),
        _ => title.to_string(),
    }
}

/// Date part of an ISO 8601 timestamp, in the timestamp's own offset.
pub fn parse_hire_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(stamp.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

pub(crate) fn test_email<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..6)
        .map(|_| EMAIL_ALPHABET[rng.gen_range(0..EMAIL_ALPHABET.len())] as char)
        .collect();
    format!("test.{suffix}@example.com")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
