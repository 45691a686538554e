use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CompensationError;
use crate::integrations::lenient::{
    null_as_default, optional_string_id, text_value, webhook_body,
};

pub const DEFAULT_CHANGE_REASON: &str = "Не вказано";

pub const FIELD_NAME: &str = "First name Last name";
pub const FIELD_PAY_RATE: &str = "Compensation - Pay Rate";
pub const FIELD_EFFECTIVE_DATE: &str = "Compensation - Effective Date";
pub const FIELD_CHANGE_REASON: &str = "Compensation - Change Reason";
pub const FIELD_COMMENT: &str = "Compensation - Comment";
pub const FIELD_DEPARTMENT: &str = "Job Information - Department";
pub const FIELD_JOB_TITLE: &str = "Job Information - Job Title";

/// BambooHR "employee changed" webhook body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompensationWebhook {
    #[serde(default, deserialize_with = "null_as_default")]
    pub employees: Vec<ChangedEmployee>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangedEmployee {
    #[serde(default, deserialize_with = "optional_string_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: BTreeMap<String, Value>,
}

/// One employee's pay-rate change, with blanks already defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompensationChange {
    pub employee_id: String,
    pub employee_name: String,
    pub new_pay_rate: String,
    pub effective_date: String,
    pub change_reason: String,
    pub comment: String,
    pub department: String,
    pub job_title: String,
}

impl CompensationChange {
    /// Every employee listed in a webhook payload.
    pub fn from_payload(payload: Value) -> Result<Vec<Self>, CompensationError> {
        let webhook: CompensationWebhook = serde_json::from_value(webhook_body(payload))
            .map_err(CompensationError::InvalidPayload)?;
        if webhook.employees.is_empty() {
            return Err(CompensationError::NoEmployees);
        }
        webhook.employees.into_iter().map(Self::from_employee).collect()
    }

    pub fn from_employee(employee: ChangedEmployee) -> Result<Self, CompensationError> {
        let employee_id = employee
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or(CompensationError::MissingEmployeeId)?;
        let field = |name: &str| {
            employee
                .fields
                .get(name)
                .and_then(text_value)
                .unwrap_or_default()
        };

        let change_reason = Some(field(FIELD_CHANGE_REASON))
            .filter(|reason| !reason.is_empty())
            .unwrap_or_else(|| DEFAULT_CHANGE_REASON.to_string());

        Ok(Self {
            employee_name: field(FIELD_NAME),
            new_pay_rate: field(FIELD_PAY_RATE),
            effective_date: field(FIELD_EFFECTIVE_DATE),
            change_reason,
            comment: field(FIELD_COMMENT),
            department: field(FIELD_DEPARTMENT),
            job_title: field(FIELD_JOB_TITLE),
            employee_id,
        })
    }
}
