use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::integrations::lenient::{null_as_default, optional_u64_id, webhook_body};

use super::picklist::PicklistOption;

pub const HIRE_EVENT_NAME: &str = "job_application.update";
pub const HIRED_STAGE: &str = "Hired";

/// Job application webhook body pushed by TeamTailor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HireEvent {
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub stage_name: Option<String>,
    /// Job application id.
    #[serde(default, deserialize_with = "optional_u64_id")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "optional_u64_id")]
    pub job_id: Option<u64>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub candidate: CandidateSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSnapshot {
    #[serde(default, deserialize_with = "optional_u64_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl HireEvent {
    /// Decode a bare event or one wrapped in `{"body": ...}`.
    pub fn from_payload(payload: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(webhook_body(payload))
    }

    pub fn is_hire_event(&self) -> bool {
        self.event_name.as_deref() == Some(HIRE_EVENT_NAME)
            && self.stage_name.as_deref() == Some(HIRED_STAGE)
    }
}

/// Pipeline step that failed without aborting the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningStep {
    Department,
    Uploads,
    Download,
    Salary,
    Picklist,
    FileUpload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepWarning {
    pub step: ProvisioningStep,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeSummary {
    pub id: Option<u64>,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub division: Option<String>,
    pub job_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub filename: String,
    pub file_id: Option<String>,
}

/// Outcome of a successful provisioning run.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisioningReport {
    pub employee: EmployeeSummary,
    pub bamboo_hr_url: Option<String>,
    pub files_uploaded: Vec<UploadedFile>,
    pub meta_fields_created: Vec<PicklistOption>,
    pub warnings: Vec<StepWarning>,
    pub created_at: DateTime<Utc>,
}
