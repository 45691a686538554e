//! TeamTailor (applicant tracking) gateway.

mod resources;

pub use resources::{
    CustomFieldValue, DepartmentAttributes, Document, Relationship, RelationshipLinks,
    RequisitionAttributes, Resource, UploadAttributes,
};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

use super::{build_client, check_status, decode_json, ApiError};
use crate::config::{HttpConfig, TeamTailorConfig};
use resources::{join_custom_field_values, CustomFieldValueAttributes};

/// Record type a custom field value hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomFieldOwner {
    Candidate,
    JobApplication,
}

impl CustomFieldOwner {
    pub fn as_str(self) -> &'static str {
        match self {
            CustomFieldOwner::Candidate => "Candidate",
            CustomFieldOwner::JobApplication => "JobApplication",
        }
    }
}

/// Operations the workflows need from the applicant-tracking system.
#[async_trait]
pub trait AtsGateway: Send + Sync {
    async fn job_requisition(&self, job_id: u64)
        -> Result<Resource<RequisitionAttributes>, ApiError>;

    /// Follow a `links.related` URL to the department resource.
    async fn department(&self, url: &str) -> Result<Resource<DepartmentAttributes>, ApiError>;

    async fn job_uploads(&self, job_id: u64) -> Result<Vec<Resource<UploadAttributes>>, ApiError>;

    /// Fetch the raw bytes behind an upload URL.
    async fn download(&self, url: &str) -> Result<Vec<u8>, ApiError>;

    async fn custom_field_values(
        &self,
        owner_id: u64,
        owner: CustomFieldOwner,
        field_id: Option<&str>,
    ) -> Result<Vec<CustomFieldValue>, ApiError>;

    /// Create a requisition, or update it when `requisition_id` is given.
    /// Returns the id TeamTailor reports back.
    async fn save_requisition(
        &self,
        payload: &Value,
        requisition_id: Option<&str>,
    ) -> Result<String, ApiError>;
}

/// reqwest-backed [`AtsGateway`].
#[derive(Debug, Clone)]
pub struct TeamTailorClient {
    api: reqwest::Client,
    files: reqwest::Client,
    base_url: String,
}

impl TeamTailorClient {
    pub fn new(config: &TeamTailorConfig, http: &HttpConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Token token={}", config.api_token))?,
        );
        headers.insert("X-Api-Version", header_value(&config.api_version)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            api: build_client(http, headers)?,
            // Upload URLs are pre-signed; sending the API token along is unnecessary.
            files: build_client(http, HeaderMap::new())?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!(%endpoint, "teamtailor GET");
        let response = self
            .api
            .get(endpoint)
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::transport(endpoint, source))?;
        let response = check_status(endpoint, response, |status| status.is_success()).await?;
        decode_json(endpoint, response).await
    }
}

fn header_value(raw: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(raw).map_err(|err| ApiError::decode("teamtailor configuration", err))
}

#[async_trait]
impl AtsGateway for TeamTailorClient {
    async fn job_requisition(
        &self,
        job_id: u64,
    ) -> Result<Resource<RequisitionAttributes>, ApiError> {
        let endpoint = self.url(&format!("jobs/{job_id}/requisition"));
        let document: Document<Resource<RequisitionAttributes>> =
            self.get_json(&endpoint, &[]).await?;
        Ok(document.data)
    }

    async fn department(&self, url: &str) -> Result<Resource<DepartmentAttributes>, ApiError> {
        let document: Document<Resource<DepartmentAttributes>> = self.get_json(url, &[]).await?;
        Ok(document.data)
    }

    async fn job_uploads(&self, job_id: u64) -> Result<Vec<Resource<UploadAttributes>>, ApiError> {
        let endpoint = self.url("uploads");
        let document: Document<Vec<Resource<UploadAttributes>>> = self
            .get_json(&endpoint, &[("filter[job]", job_id.to_string())])
            .await?;
        Ok(document.data)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .files
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::transport(url, source))?;
        let response = check_status(url, response, |status| status.is_success()).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::transport(url, source))?;
        Ok(bytes.to_vec())
    }

    async fn custom_field_values(
        &self,
        owner_id: u64,
        owner: CustomFieldOwner,
        field_id: Option<&str>,
    ) -> Result<Vec<CustomFieldValue>, ApiError> {
        let endpoint = self.url("custom-field-values");
        let mut query = vec![
            ("filter[owner-id]", owner_id.to_string()),
            ("filter[owner-type]", owner.as_str().to_string()),
            ("include", "custom-field".to_string()),
        ];
        if let Some(field_id) = field_id {
            query.push(("filter[custom-field-id]", field_id.to_string()));
        }

        let document: Document<Vec<Resource<CustomFieldValueAttributes>>> =
            self.get_json(&endpoint, &query).await?;
        Ok(join_custom_field_values(document))
    }

    async fn save_requisition(
        &self,
        payload: &Value,
        requisition_id: Option<&str>,
    ) -> Result<String, ApiError> {
        let request = match requisition_id {
            Some(id) => self.api.patch(self.url(&format!("requisitions/{id}"))),
            None => self.api.post(self.url("requisitions")),
        };
        let endpoint = self.url("requisitions");

        let response = request
            .json(payload)
            .send()
            .await
            .map_err(|source| ApiError::transport(&endpoint, source))?;
        let response = check_status(&endpoint, response, |status| status.is_success()).await?;
        let document: Document<Resource<Value>> = decode_json(&endpoint, response).await?;

        document
            .data
            .id
            .or_else(|| requisition_id.map(str::to_string))
            .ok_or_else(|| ApiError::decode(&endpoint, "requisition response carried no id"))
    }
}
