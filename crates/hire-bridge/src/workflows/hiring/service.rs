use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, Utc};
use serde_json::Value;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::domain::{
    EmployeeSummary, HireEvent, ProvisioningReport, ProvisioningStep, StepWarning, UploadedFile,
};
use super::payload::build_employee;
use super::picklist;
use super::salary::{find_salary, parse_salary};
use crate::config::{AppConfig, BambooHrConfig, HiringConfig};
use crate::integrations::bamboohr::{EmployeeFileUpload, HrisGateway};
use crate::integrations::teamtailor::AtsGateway;
use crate::integrations::ApiError;

const UNKNOWN_FILE: &str = "unknown_file";

/// Settings the pipeline reads on every run.
#[derive(Debug, Clone)]
pub struct ProvisioningSettings {
    pub hiring: HiringConfig,
    pub bamboohr: BambooHrConfig,
    pub salary_field_id: String,
}

impl ProvisioningSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            hiring: config.hiring.clone(),
            bamboohr: config.bamboohr.clone(),
            salary_field_id: config.teamtailor.salary_field_id.clone(),
        }
    }
}

/// An ATS upload written to the run's staging directory.
#[derive(Debug)]
struct StagedDocument {
    file_name: String,
    path: PathBuf,
}

/// Turns "Hired" webhooks into BambooHR employees.
pub struct HireProvisioningService<A, H> {
    ats: Arc<A>,
    hris: Arc<H>,
    settings: ProvisioningSettings,
}

impl<A, H> HireProvisioningService<A, H>
where
    A: AtsGateway + 'static,
    H: HrisGateway + 'static,
{
    pub fn new(ats: Arc<A>, hris: Arc<H>, settings: ProvisioningSettings) -> Self {
        Self {
            ats,
            hris,
            settings,
        }
    }

    /// Decode a raw webhook body and provision it if it is a hire.
    pub async fn handle_payload(
        &self,
        payload: Value,
    ) -> Result<ProvisioningReport, ProvisioningError> {
        let event = HireEvent::from_payload(payload).map_err(ProvisioningError::InvalidPayload)?;
        if !event.is_hire_event() {
            debug!(
                event_name = ?event.event_name,
                stage_name = ?event.stage_name,
                "ignoring webhook"
            );
            return Err(ProvisioningError::Ignored {
                event_name: event.event_name,
                stage_name: event.stage_name,
            });
        }
        self.provision(&event).await
    }

    /// Run the pipeline for an event already known to be a hire.
    pub async fn provision(
        &self,
        event: &HireEvent,
    ) -> Result<ProvisioningReport, ProvisioningError> {
        let job_id = event.job_id.ok_or(ProvisioningError::MissingJobId)?;
        let candidate_id = event.candidate.id;
        let mut warnings = Vec::new();
        info!(job_id, candidate_id = ?candidate_id, "provisioning hired candidate");

        let requisition = self
            .ats
            .job_requisition(job_id)
            .await
            .map_err(|source| ProvisioningError::Requisition { job_id, source })?;

        let department = match requisition.related_link("department") {
            Some(url) => match self.ats.department(url).await {
                Ok(department) => department
                    .attributes
                    .name
                    .filter(|name| !name.trim().is_empty()),
                Err(err) => {
                    note(&mut warnings, ProvisioningStep::Department, &err);
                    None
                }
            },
            None => None,
        };

        let (staging, staged) = self.stage_documents(job_id, candidate_id, &mut warnings).await;

        let pay_rate = match candidate_id {
            Some(candidate_id) => self.lookup_pay_rate(candidate_id, event.id, &mut warnings).await,
            None => None,
        };

        let mut employee = build_employee(
            event,
            &requisition.attributes,
            department.as_deref(),
            &self.settings.hiring,
            Local::now().date_naive(),
            &mut rand::thread_rng(),
        );
        employee.pay_rate = pay_rate;

        let lists = self
            .hris
            .meta_lists()
            .await
            .map_err(ProvisioningError::MetaFields)?;
        let mut created_options = Vec::new();
        for option in picklist::missing_options(&employee, &lists) {
            match self.hris.add_list_option(option.field_id, &option.value).await {
                Ok(()) => {
                    info!(field = option.field_name.alias(), value = %option.value, "created list option");
                    created_options.push(option);
                }
                Err(err) => note(&mut warnings, ProvisioningStep::Picklist, &err),
            }
        }

        let employee_id = self
            .hris
            .create_employee(&employee)
            .await
            .map_err(ProvisioningError::EmployeeCreation)?;
        info!(employee_id = ?employee_id, "employee created");

        let files_uploaded = match employee_id {
            Some(employee_id) => self.upload_documents(employee_id, staged, &mut warnings).await,
            None => {
                if !staged.is_empty() {
                    warnings.push(StepWarning {
                        step: ProvisioningStep::FileUpload,
                        detail: format!(
                            "employee id missing from response; {} staged file(s) not uploaded",
                            staged.len()
                        ),
                    });
                }
                Vec::new()
            }
        };

        if let Some(staging) = staging {
            if let Err(err) = staging.close() {
                warn!(error = %err, "failed to remove staging directory");
            }
        }

        Ok(ProvisioningReport {
            employee: EmployeeSummary {
                id: employee_id,
                name: format!("{} {}", employee.first_name, employee.last_name),
                email: employee.work_email,
                department: employee.department,
                division: employee.division,
                job_title: employee.job_title,
            },
            bamboo_hr_url: employee_id.map(|id| self.settings.bamboohr.employee_url(id)),
            files_uploaded,
            meta_fields_created: created_options,
            warnings,
            created_at: Utc::now(),
        })
    }

    async fn stage_documents(
        &self,
        job_id: u64,
        candidate_id: Option<u64>,
        warnings: &mut Vec<StepWarning>,
    ) -> (Option<TempDir>, Vec<StagedDocument>) {
        let uploads = match self.ats.job_uploads(job_id).await {
            Ok(uploads) => uploads,
            Err(err) => {
                note(warnings, ProvisioningStep::Uploads, &err);
                return (None, Vec::new());
            }
        };

        let candidate = candidate_id.map(|id| id.to_string());
        let wanted: Vec<_> = uploads
            .into_iter()
            .filter(|upload| match (upload.related_id("candidate"), candidate.as_deref()) {
                (Some(owner), Some(candidate)) => owner == candidate,
                _ => true,
            })
            .filter(|upload| {
                upload
                    .attributes
                    .url
                    .as_deref()
                    .is_some_and(|url| !url.trim().is_empty())
            })
            .collect();
        debug!(count = wanted.len(), "uploads to stage");
        if wanted.is_empty() {
            return (None, Vec::new());
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("hire-bridge-");
        let created = match &self.settings.hiring.staging_dir {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        let staging = match created {
            Ok(dir) => dir,
            Err(source) => {
                let err = ApiError::Io {
                    context: "creating staging directory".to_string(),
                    source,
                };
                note(warnings, ProvisioningStep::Download, &err);
                return (None, Vec::new());
            }
        };

        let mut staged = Vec::new();
        for (index, upload) in wanted.into_iter().enumerate() {
            let Some(url) = upload.attributes.url.as_deref() else {
                continue;
            };
            let file_name = upload
                .attributes
                .file_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_FILE.to_string());

            let bytes = match self.ats.download(url).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    note(warnings, ProvisioningStep::Download, &err);
                    continue;
                }
            };

            let path = staging
                .path()
                .join(format!("{index}-{}", sanitize_file_name(&file_name)));
            if let Err(source) = tokio::fs::write(&path, &bytes).await {
                let err = ApiError::Io {
                    context: format!("staging {file_name}"),
                    source,
                };
                note(warnings, ProvisioningStep::Download, &err);
                continue;
            }
            debug!(%file_name, bytes = bytes.len(), "staged upload");
            staged.push(StagedDocument { file_name, path });
        }

        (Some(staging), staged)
    }

    async fn lookup_pay_rate(
        &self,
        candidate_id: u64,
        job_application_id: Option<u64>,
        warnings: &mut Vec<StepWarning>,
    ) -> Option<String> {
        let applications: Vec<u64> = job_application_id.into_iter().collect();
        let raw = find_salary(
            self.ats.as_ref(),
            candidate_id,
            &applications,
            &self.settings.salary_field_id,
        )
        .await?;

        match parse_salary(&raw) {
            Some(amount) => Some(format!("{amount:.2} {}", self.settings.hiring.salary_currency)),
            None => {
                warnings.push(StepWarning {
                    step: ProvisioningStep::Salary,
                    detail: format!("could not parse salary value '{raw}'"),
                });
                warn!(%raw, "unparseable salary value");
                None
            }
        }
    }

    async fn upload_documents(
        &self,
        employee_id: u64,
        staged: Vec<StagedDocument>,
        warnings: &mut Vec<StepWarning>,
    ) -> Vec<UploadedFile> {
        let mut uploaded = Vec::new();
        for document in staged {
            let upload = EmployeeFileUpload {
                path: &document.path,
                file_name: &document.file_name,
                category: &self.settings.bamboohr.upload_category,
            };
            match self.hris.upload_employee_file(employee_id, upload).await {
                Ok(file_id) => {
                    info!(file_name = %document.file_name, "uploaded employee file");
                    uploaded.push(UploadedFile {
                        filename: document.file_name.clone(),
                        file_id,
                    });
                }
                Err(err) => note(warnings, ProvisioningStep::FileUpload, &err),
            }

            if let Err(err) = tokio::fs::remove_file(&document.path).await {
                debug!(path = %document.path.display(), error = %err, "staged file not removed");
            }
        }
        uploaded
    }
}

fn note(warnings: &mut Vec<StepWarning>, step: ProvisioningStep, err: &ApiError) {
    warn!(?step, error = %err, "provisioning step failed");
    warnings.push(StepWarning {
        step,
        detail: err.to_string(),
    });
}

/// Keep the original name recognisable while making it safe as a path segment.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if cleaned.is_empty() {
        UNKNOWN_FILE.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Error raised by the provisioning pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    #[error("invalid webhook payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("not a hire event (event {event_name:?}, stage {stage_name:?})")]
    Ignored {
        event_name: Option<String>,
        stage_name: Option<String>,
    },
    #[error("webhook payload carries no job_id")]
    MissingJobId,
    #[error("failed to fetch requisition for job {job_id}: {source}")]
    Requisition {
        job_id: u64,
        #[source]
        source: ApiError,
    },
    #[error("failed to fetch BambooHR list fields: {0}")]
    MetaFields(#[source] ApiError),
    #[error("failed to create employee: {0}")]
    EmployeeCreation(#[source] ApiError),
}

impl ProvisioningError {
    /// The payload itself is at fault rather than an upstream system.
    pub fn is_invalid_payload(&self) -> bool {
        matches!(
            self,
            ProvisioningError::InvalidPayload(_) | ProvisioningError::MissingJobId
        )
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_file_name;

    #[test]
    fn sanitizes_staged_file_names() {
        assert_eq!(sanitize_file_name("cv.pdf"), "cv.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_file_name("a\\b:c"), "a_b_c");
        assert_eq!(sanitize_file_name(" .. "), "unknown_file");
    }
}
