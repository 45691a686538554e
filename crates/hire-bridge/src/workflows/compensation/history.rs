//! Picking the pay rate that was in force before a change.

use chrono::NaiveDate;
use serde_json::Value;

use crate::integrations::bamboohr::CompensationRow;
use crate::integrations::lenient::scalar_to_string;

const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationRecord {
    pub date: NaiveDate,
    pub raw_date: String,
    /// Amount and currency, e.g. `"3000.00 USD"`.
    pub rate: String,
}

impl CompensationRecord {
    fn from_row(row: &CompensationRow) -> Option<Self> {
        let raw_date = row.start_date.as_deref()?.trim().to_string();
        let date = parse_date(&raw_date)?;
        let rate = row.rate.as_ref().and_then(render_rate)?;
        Some(Self {
            date,
            raw_date,
            rate,
        })
    }
}

/// Complete rows only, oldest first.
pub fn compensation_records(rows: &[CompensationRow]) -> Vec<CompensationRecord> {
    let mut records: Vec<_> = rows.iter().filter_map(CompensationRecord::from_row).collect();
    records.sort_by_key(|record| record.date);
    records
}

/// The latest rate strictly before `effective_date`; failing that, the most
/// recent rate unless it is the change itself.
pub fn previous_pay_rate(rows: &[CompensationRow], effective_date: &str) -> Option<String> {
    let records = compensation_records(rows);
    let effective = parse_date(effective_date);

    if let Some(effective) = effective {
        if let Some(before) = records.iter().rev().find(|record| record.date < effective) {
            return Some(before.rate.clone());
        }
    }

    let latest = records.last()?;
    let is_the_change = match effective {
        Some(effective) => latest.date == effective,
        None => latest.raw_date == effective_date.trim(),
    };
    (!is_the_change).then(|| latest.rate.clone())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn render_rate(rate: &Value) -> Option<String> {
    match rate {
        Value::Object(fields) => {
            let amount = fields.get("value").and_then(scalar_to_string)?;
            let amount = amount.trim();
            if amount.is_empty() {
                return None;
            }
            let currency = fields
                .get("currency")
                .and_then(scalar_to_string)
                .filter(|currency| !currency.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
            Some(format!("{amount} {currency}"))
        }
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) if text.trim().contains(' ') => Some(text.trim().to_string()),
        other => scalar_to_string(other).map(|amount| format!("{} {DEFAULT_CURRENCY}", amount.trim())),
    }
}
