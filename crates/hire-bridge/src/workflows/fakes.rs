//! In-memory gateways shared by the workflow tests.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::integrations::bamboohr::{
    CompensationRow, EmployeeFileUpload, EmployeeRecord, HrisGateway, MetaList,
};
use crate::integrations::notion::{Page, WorkspaceGateway};
use crate::integrations::slack::ChatNotifier;
use crate::integrations::teamtailor::{
    AtsGateway, CustomFieldOwner, CustomFieldValue, DepartmentAttributes, RequisitionAttributes,
    Resource, UploadAttributes,
};
use crate::integrations::ApiError;

fn not_found(endpoint: &str) -> ApiError {
    ApiError::Status {
        endpoint: endpoint.to_string(),
        status: 404,
        body: "not found".to_string(),
    }
}

fn unavailable(endpoint: &str) -> ApiError {
    ApiError::Status {
        endpoint: endpoint.to_string(),
        status: 503,
        body: "service unavailable".to_string(),
    }
}

fn decode<T: serde::de::DeserializeOwned>(endpoint: &str, value: &Value) -> Result<T, ApiError> {
    serde_json::from_value(value.clone()).map_err(|err| ApiError::decode(endpoint, err))
}

#[derive(Default)]
pub(crate) struct FakeAts {
    pub requisition: Option<Value>,
    pub department: Option<Value>,
    pub uploads: Vec<Value>,
    pub fail_uploads: bool,
    pub files: BTreeMap<String, Vec<u8>>,
    pub custom_fields: Vec<(u64, CustomFieldOwner, Vec<CustomFieldValue>)>,
    pub fail_custom_fields: bool,
    pub fail_save: bool,
    pub calls: Mutex<Vec<String>>,
    pub saved: Mutex<Vec<(Value, Option<String>)>>,
}

impl FakeAts {
    pub fn with_custom_fields(
        mut self,
        owner_id: u64,
        owner: CustomFieldOwner,
        values: Vec<CustomFieldValue>,
    ) -> Self {
        self.custom_fields.push((owner_id, owner, values));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl AtsGateway for FakeAts {
    async fn job_requisition(
        &self,
        job_id: u64,
    ) -> Result<Resource<RequisitionAttributes>, ApiError> {
        let endpoint = format!("jobs/{job_id}/requisition");
        self.record(endpoint.clone());
        match &self.requisition {
            Some(value) => decode(&endpoint, value),
            None => Err(not_found(&endpoint)),
        }
    }

    async fn department(&self, url: &str) -> Result<Resource<DepartmentAttributes>, ApiError> {
        self.record(format!("department {url}"));
        match &self.department {
            Some(value) => decode(url, value),
            None => Err(not_found(url)),
        }
    }

    async fn job_uploads(&self, job_id: u64) -> Result<Vec<Resource<UploadAttributes>>, ApiError> {
        let endpoint = format!("uploads?filter[job]={job_id}");
        self.record(endpoint.clone());
        if self.fail_uploads {
            return Err(unavailable(&endpoint));
        }
        self.uploads
            .iter()
            .map(|upload| decode(&endpoint, upload))
            .collect()
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        self.record(format!("download {url}"));
        self.files.get(url).cloned().ok_or_else(|| not_found(url))
    }

    async fn custom_field_values(
        &self,
        owner_id: u64,
        owner: CustomFieldOwner,
        field_id: Option<&str>,
    ) -> Result<Vec<CustomFieldValue>, ApiError> {
        self.record(format!(
            "custom-field-values {} {owner_id} {}",
            owner.as_str(),
            field_id.unwrap_or("*")
        ));
        if self.fail_custom_fields {
            return Err(unavailable("custom-field-values"));
        }
        Ok(self
            .custom_fields
            .iter()
            .filter(|(id, kind, _)| *id == owner_id && *kind == owner)
            .flat_map(|(_, _, values)| values.iter().cloned())
            .filter(|value| field_id.is_none() || value.field_id.as_deref() == field_id)
            .collect())
    }

    async fn save_requisition(
        &self,
        payload: &Value,
        requisition_id: Option<&str>,
    ) -> Result<String, ApiError> {
        self.saved
            .lock()
            .expect("saved lock")
            .push((payload.clone(), requisition_id.map(str::to_string)));
        if self.fail_save {
            return Err(ApiError::Status {
                endpoint: "requisitions".to_string(),
                status: 422,
                body: "invalid requisition".to_string(),
            });
        }
        Ok(requisition_id.unwrap_or("8800").to_string())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedUpload {
    pub employee_id: u64,
    pub file_name: String,
    pub category: String,
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

#[derive(Default)]
pub(crate) struct FakeHris {
    pub meta_lists: Vec<MetaList>,
    pub fail_meta_lists: bool,
    pub rejected_options: Vec<String>,
    pub employee_id: Option<u64>,
    pub fail_create: bool,
    pub failing_files: Vec<String>,
    pub compensation: Vec<CompensationRow>,
    pub fail_compensation: bool,
    pub added_options: Mutex<Vec<(u64, String)>>,
    pub created: Mutex<Vec<EmployeeRecord>>,
    pub uploads: Mutex<Vec<RecordedUpload>>,
}

impl FakeHris {
    pub fn created(&self) -> Vec<EmployeeRecord> {
        self.created.lock().expect("created lock").clone()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().expect("uploads lock").clone()
    }

    pub fn added_options(&self) -> Vec<(u64, String)> {
        self.added_options.lock().expect("options lock").clone()
    }
}

#[async_trait]
impl HrisGateway for FakeHris {
    async fn meta_lists(&self) -> Result<Vec<MetaList>, ApiError> {
        if self.fail_meta_lists {
            return Err(unavailable("meta/lists"));
        }
        Ok(self.meta_lists.clone())
    }

    async fn add_list_option(&self, field_id: u64, value: &str) -> Result<(), ApiError> {
        if self.rejected_options.iter().any(|rejected| rejected == value) {
            return Err(ApiError::Status {
                endpoint: format!("meta/lists/{field_id}"),
                status: 400,
                body: "option rejected".to_string(),
            });
        }
        self.added_options
            .lock()
            .expect("options lock")
            .push((field_id, value.to_string()));
        Ok(())
    }

    async fn create_employee(&self, employee: &EmployeeRecord) -> Result<Option<u64>, ApiError> {
        if self.fail_create {
            return Err(ApiError::Status {
                endpoint: "employees".to_string(),
                status: 400,
                body: "workEmail already in use".to_string(),
            });
        }
        self.created
            .lock()
            .expect("created lock")
            .push(employee.clone());
        Ok(self.employee_id)
    }

    async fn upload_employee_file(
        &self,
        employee_id: u64,
        upload: EmployeeFileUpload<'_>,
    ) -> Result<Option<String>, ApiError> {
        let contents = std::fs::read(upload.path).map_err(|source| ApiError::Io {
            context: format!("reading {}", upload.path.display()),
            source,
        })?;
        if self.failing_files.iter().any(|name| name == upload.file_name) {
            return Err(ApiError::Status {
                endpoint: format!("employees/{employee_id}/files"),
                status: 413,
                body: "file too large".to_string(),
            });
        }

        let mut uploads = self.uploads.lock().expect("uploads lock");
        uploads.push(RecordedUpload {
            employee_id,
            file_name: upload.file_name.to_string(),
            category: upload.category.to_string(),
            path: upload.path.to_path_buf(),
            contents,
        });
        Ok(Some(format!("file-{}", uploads.len())))
    }

    async fn compensation_history(
        &self,
        employee_id: &str,
    ) -> Result<Vec<CompensationRow>, ApiError> {
        if self.fail_compensation {
            return Err(unavailable(&format!("employees/{employee_id}/tables/compensation")));
        }
        Ok(self.compensation.clone())
    }
}

#[derive(Default)]
pub(crate) struct FakeNotifier {
    pub fail: bool,
    /// Reject messages whose text mentions any of these.
    pub failing_mentions: Vec<String>,
    pub messages: Mutex<Vec<Value>>,
}

impl FakeNotifier {
    pub fn messages(&self) -> Vec<Value> {
        self.messages.lock().expect("messages lock").clone()
    }
}

#[async_trait]
impl ChatNotifier for FakeNotifier {
    async fn post_message(&self, message: &Value) -> Result<(), ApiError> {
        let text = message["text"].as_str().unwrap_or_default();
        if self.fail || self.failing_mentions.iter().any(|name| text.contains(name.as_str())) {
            return Err(unavailable("slack incoming webhook"));
        }
        self.messages
            .lock()
            .expect("messages lock")
            .push(message.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeWorkspace {
    pub pages: BTreeMap<String, Page>,
    pub requested: Mutex<Vec<String>>,
}

impl FakeWorkspace {
    pub fn with_page(mut self, page: Value) -> Self {
        let page: Page = serde_json::from_value(page).expect("page fixture decodes");
        self.pages.insert(page.id.clone(), page);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().expect("requested lock").clone()
    }
}

#[async_trait]
impl WorkspaceGateway for FakeWorkspace {
    async fn page(&self, page_id: &str) -> Result<Page, ApiError> {
        self.requested
            .lock()
            .expect("requested lock")
            .push(page_id.to_string());
        self.pages
            .get(page_id)
            .cloned()
            .ok_or_else(|| not_found(&format!("pages/{page_id}")))
    }
}
