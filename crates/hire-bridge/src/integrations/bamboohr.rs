//! BambooHR (HR information system) gateway.

use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, LOCATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::lenient::{null_as_default, optional_string_id, optional_u64_id, scalar_to_string};
use super::{build_client, check_status, decode_json, ApiError};
use crate::config::{BambooHrConfig, HttpConfig};

/// Employee create payload in BambooHR's field vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub first_name: String,
    pub last_name: String,
    pub work_email: String,
    pub hire_date: String,
    pub job_title: String,
    pub employment_history_status: String,
    pub pay_type: String,
    pub pay_per: String,
    pub exempt: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_rate: Option<String>,
}

/// A list field ("picklist") from `meta/lists`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaList {
    #[serde(default, deserialize_with = "optional_u64_id")]
    pub field_id: Option<u64>,
    #[serde(default)]
    pub manageable: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<MetaListOption>,
}

impl MetaList {
    pub fn is_manageable(&self) -> bool {
        self.manageable
            .as_deref()
            .is_some_and(|flag| flag.eq_ignore_ascii_case("yes"))
    }

    /// Case-insensitive match against each option's `value` or `name`.
    pub fn has_option(&self, candidate: &str) -> bool {
        let wanted = candidate.trim().to_lowercase();
        self.options.iter().any(|option| {
            [option.value.as_deref(), option.name.as_deref()]
                .into_iter()
                .flatten()
                .any(|label| label.trim().to_lowercase() == wanted)
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetaListOption {
    #[serde(default, deserialize_with = "optional_string_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub archived: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MetaListsResponse {
    Bare(Vec<MetaList>),
    Wrapped {
        #[serde(default)]
        lists: Vec<MetaList>,
    },
}

/// One row of the `compensation` table, as BambooHR returns it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationRow {
    #[serde(default, deserialize_with = "optional_string_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    /// Either `{"value": "...", "currency": "..."}` or a `"50000.00 USD"` string.
    #[serde(default)]
    pub rate: Option<Value>,
}

/// File staged on disk, ready to be attached to an employee.
#[derive(Debug, Clone, Copy)]
pub struct EmployeeFileUpload<'a> {
    pub path: &'a Path,
    pub file_name: &'a str,
    pub category: &'a str,
}

/// Operations the workflows need from the HR system.
#[async_trait]
pub trait HrisGateway: Send + Sync {
    async fn meta_lists(&self) -> Result<Vec<MetaList>, ApiError>;

    /// Register `value` as a new option of the list field `field_id`.
    async fn add_list_option(&self, field_id: u64, value: &str) -> Result<(), ApiError>;

    /// Create the employee, returning the id parsed from `Location` if any.
    async fn create_employee(&self, employee: &EmployeeRecord) -> Result<Option<u64>, ApiError>;

    /// Attach a file, returning BambooHR's file id when the body carries one.
    async fn upload_employee_file(
        &self,
        employee_id: u64,
        upload: EmployeeFileUpload<'_>,
    ) -> Result<Option<String>, ApiError>;

    async fn compensation_history(&self, employee_id: &str)
        -> Result<Vec<CompensationRow>, ApiError>;
}

/// `company_information`, the cheapest authenticated call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInformation {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub legal_name: Option<String>,
}

/// `employees/directory`: the field catalogue plus one entry per employee.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EmployeeDirectory {
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub employees: Vec<DirectoryEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    #[serde(default, deserialize_with = "optional_string_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub work_email: Option<String>,
}

/// A webhook registered in BambooHR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WebhookSummary {
    #[serde(default, deserialize_with = "optional_string_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WebhooksResponse {
    Bare(Vec<WebhookSummary>),
    Wrapped {
        #[serde(default)]
        webhooks: Vec<WebhookSummary>,
    },
}

/// Read-only BambooHR lookups used by operators to inspect an account.
#[async_trait]
pub trait HrisDirectory: Send + Sync {
    async fn company_information(&self) -> Result<CompanyInformation, ApiError>;

    async fn employee_directory(&self) -> Result<EmployeeDirectory, ApiError>;

    async fn webhooks(&self) -> Result<Vec<WebhookSummary>, ApiError>;

    async fn time_tracking_projects(&self) -> Result<Value, ApiError>;

    /// Entries between `start` and `end` inclusive, optionally for some employees only.
    async fn timesheet_entries(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        employee_ids: &[u64],
    ) -> Result<Value, ApiError>;

    async fn datasets(&self) -> Result<Value, ApiError>;
}

/// reqwest-backed [`HrisGateway`] and [`HrisDirectory`].
#[derive(Debug, Clone)]
pub struct BambooHrClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BambooHrClient {
    pub fn new(config: &BambooHrConfig, http: &HttpConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            http: build_client(http, headers)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.http
            .request(method, endpoint)
            .basic_auth(&self.api_key, Some("x"))
    }

    async fn get_json<T>(&self, endpoint: &str) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        self.get_json_with(endpoint, &[]).await
    }

    async fn get_json_with<T>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!(%endpoint, params = query.len(), "bamboohr GET");
        let response = self
            .request(Method::GET, endpoint)
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::transport(endpoint, source))?;
        let response = check_status(endpoint, response, |status| status == StatusCode::OK).await?;
        decode_json(endpoint, response).await
    }
}

#[async_trait]
impl HrisGateway for BambooHrClient {
    async fn meta_lists(&self) -> Result<Vec<MetaList>, ApiError> {
        let endpoint = self.url("meta/lists");
        let lists = match self.get_json::<MetaListsResponse>(&endpoint).await? {
            MetaListsResponse::Bare(lists) | MetaListsResponse::Wrapped { lists } => lists,
        };
        Ok(lists)
    }

    async fn add_list_option(&self, field_id: u64, value: &str) -> Result<(), ApiError> {
        let endpoint = self.url(&format!("meta/lists/{field_id}"));

        // The PUT replaces the option set, so send back what is already there.
        let current: Value = self.get_json(&endpoint).await?;
        let mut options = current
            .get("options")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        options.push(json!({ "value": value }));

        let response = self
            .request(Method::PUT, &endpoint)
            .json(&json!({ "options": options }))
            .send()
            .await
            .map_err(|source| ApiError::transport(&endpoint, source))?;
        check_status(&endpoint, response, |status| status == StatusCode::OK).await?;
        Ok(())
    }

    async fn create_employee(&self, employee: &EmployeeRecord) -> Result<Option<u64>, ApiError> {
        let endpoint = self.url("employees");
        let response = self
            .request(Method::POST, &endpoint)
            .json(employee)
            .send()
            .await
            .map_err(|source| ApiError::transport(&endpoint, source))?;
        let response =
            check_status(&endpoint, response, |status| status == StatusCode::CREATED).await?;

        Ok(response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(employee_id_from_location))
    }

    async fn upload_employee_file(
        &self,
        employee_id: u64,
        upload: EmployeeFileUpload<'_>,
    ) -> Result<Option<String>, ApiError> {
        let endpoint = self.url(&format!("employees/{employee_id}/files"));
        let bytes = tokio::fs::read(upload.path)
            .await
            .map_err(|source| ApiError::Io {
                context: format!("unable to read staged file {}", upload.path.display()),
                source,
            })?;

        let content_type = mime_guess::from_path(upload.file_name)
            .first_or_octet_stream()
            .to_string();
        let part = Part::bytes(bytes)
            .file_name(upload.file_name.to_string())
            .mime_str(&content_type)
            .map_err(|source| ApiError::transport(&endpoint, source))?;
        let form = Form::new()
            .part("file", part)
            .text("category", upload.category.to_string())
            .text("fileName", upload.file_name.to_string());

        let response = self
            .request(Method::POST, &endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|source| ApiError::transport(&endpoint, source))?;
        let response =
            check_status(&endpoint, response, |status| status == StatusCode::CREATED).await?;

        let body = response.text().await.unwrap_or_default();
        Ok(file_id_from_body(&body))
    }

    async fn compensation_history(
        &self,
        employee_id: &str,
    ) -> Result<Vec<CompensationRow>, ApiError> {
        let endpoint = self.url(&format!("employees/{employee_id}/tables/compensation"));
        self.get_json(&endpoint).await
    }
}

#[async_trait]
impl HrisDirectory for BambooHrClient {
    async fn company_information(&self) -> Result<CompanyInformation, ApiError> {
        self.get_json(&self.url("company_information")).await
    }

    async fn employee_directory(&self) -> Result<EmployeeDirectory, ApiError> {
        self.get_json(&self.url("employees/directory")).await
    }

    async fn webhooks(&self) -> Result<Vec<WebhookSummary>, ApiError> {
        let webhooks = match self.get_json::<WebhooksResponse>(&self.url("webhooks")).await? {
            WebhooksResponse::Bare(webhooks) | WebhooksResponse::Wrapped { webhooks } => webhooks,
        };
        Ok(webhooks)
    }

    async fn time_tracking_projects(&self) -> Result<Value, ApiError> {
        self.get_json(&self.url("time_tracking/projects")).await
    }

    async fn timesheet_entries(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        employee_ids: &[u64],
    ) -> Result<Value, ApiError> {
        let endpoint = self.url("time_tracking/timesheet_entries");
        self.get_json_with(&endpoint, &timesheet_query(start, end, employee_ids))
            .await
    }

    async fn datasets(&self) -> Result<Value, ApiError> {
        self.get_json(&self.url("datasets")).await
    }
}

fn timesheet_query(
    start: NaiveDate,
    end: NaiveDate,
    employee_ids: &[u64],
) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("start", start.format("%Y-%m-%d").to_string()),
        ("end", end.format("%Y-%m-%d").to_string()),
    ];
    if !employee_ids.is_empty() {
        let ids: Vec<String> = employee_ids.iter().map(u64::to_string).collect();
        query.push(("employeeIds", ids.join(",")));
    }
    query
}

/// Pull the numeric id out of `.../employees/{id}` style locations.
pub fn employee_id_from_location(location: &str) -> Option<u64> {
    let (_, rest) = location.split_once("/employees/")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn file_id_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("id").and_then(scalar_to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::RawQuery;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::time::Duration;

    #[test]
    fn parses_employee_id_from_location() {
        assert_eq!(
            employee_id_from_location("https://api.bamboohr.com/api/gateway.php/acme/v1/employees/4521"),
            Some(4521)
        );
        assert_eq!(employee_id_from_location("/v1/employees/77/"), Some(77));
        assert_eq!(employee_id_from_location("/v1/employees/"), None);
        assert_eq!(employee_id_from_location("/v1/candidates/77"), None);
    }

    #[test]
    fn meta_lists_accept_bare_and_wrapped_shapes() {
        let bare = r#"[{"fieldId": 4, "manageable": "yes", "alias": "department", "options": []}]"#;
        let wrapped = r#"{"lists": [{"fieldId": "4", "manageable": "yes", "alias": "department", "options": null}]}"#;

        for raw in [bare, wrapped] {
            let lists = match serde_json::from_str::<MetaListsResponse>(raw).expect("decodes") {
                MetaListsResponse::Bare(lists) | MetaListsResponse::Wrapped { lists } => lists,
            };
            assert_eq!(lists.len(), 1);
            assert_eq!(lists[0].field_id, Some(4));
            assert!(lists[0].is_manageable());
        }
    }

    #[test]
    fn option_match_ignores_case_and_checks_name_or_value() {
        let list = MetaList {
            field_id: Some(4),
            manageable: Some("yes".to_string()),
            options: vec![
                MetaListOption {
                    id: Some("1".to_string()),
                    name: Some("Marketing".to_string()),
                    ..MetaListOption::default()
                },
                MetaListOption {
                    value: Some("Engineering".to_string()),
                    ..MetaListOption::default()
                },
            ],
            ..MetaList::default()
        };

        assert!(list.has_option("marketing"));
        assert!(list.has_option("ENGINEERING "));
        assert!(!list.has_option("Finance"));
    }

    #[test]
    fn employee_record_serializes_camel_case_without_empty_optionals() {
        let record = EmployeeRecord {
            first_name: "Iryna".to_string(),
            last_name: "Koval".to_string(),
            work_email: "iryna@example.com".to_string(),
            hire_date: "2025-01-15".to_string(),
            job_title: "Senior Data Analyst".to_string(),
            employment_history_status: "Full-Time".to_string(),
            pay_type: "Salary".to_string(),
            pay_per: "Year".to_string(),
            exempt: "Exempt".to_string(),
            location: "Remote".to_string(),
            department: Some("Marketing".to_string()),
            ..EmployeeRecord::default()
        };

        let value = serde_json::to_value(&record).expect("serializes");
        assert_eq!(value["firstName"], "Iryna");
        assert_eq!(value["employmentHistoryStatus"], "Full-Time");
        assert_eq!(value["department"], "Marketing");
        assert!(value.get("division").is_none());
        assert!(value.get("mobilePhone").is_none());
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}/api/v1")
    }

    fn client(base_url: String) -> BambooHrClient {
        let config = BambooHrConfig {
            company_domain: "acme".to_string(),
            api_key: "bamboo-key".to_string(),
            base_url,
            upload_category: "16".to_string(),
        };
        let http = HttpConfig {
            timeout: Duration::from_secs(5),
        };
        BambooHrClient::new(&config, &http).expect("client builds")
    }

    fn echo_query() -> axum::routing::MethodRouter {
        get(|RawQuery(query): RawQuery| async move { Json(json!({ "query": query })) })
    }

    #[tokio::test]
    async fn directory_lookups_authenticate_and_decode() {
        let router = Router::new()
            .route(
                "/api/v1/company_information",
                get(|headers: axum::http::HeaderMap| async move {
                    let authorized = headers
                        .get(axum::http::header::AUTHORIZATION)
                        .is_some_and(|value| value == "Basic YmFtYm9vLWtleTp4");
                    let display_name = if authorized { "Acme" } else { "anonymous" };
                    Json(json!({
                        "displayName": display_name,
                        "legalName": "Acme Holdings LLC"
                    }))
                }),
            )
            .route(
                "/api/v1/employees/directory",
                get(|| async {
                    Json(json!({
                        "fields": [{ "id": "displayName", "type": "text" }],
                        "employees": [
                            { "id": 4521, "displayName": "Iryna Koval", "jobTitle": "Data Analyst" },
                            { "id": "77", "displayName": "Olena Shevchenko", "workEmail": null }
                        ]
                    }))
                }),
            )
            .route(
                "/api/v1/webhooks",
                get(|| async {
                    Json(json!({ "webhooks": [
                        { "id": 12, "name": "Pay rate changes", "url": "https://hooks.acme.test/pay" }
                    ] }))
                }),
            );
        let client = client(serve(router).await);

        let company = client.company_information().await.expect("company info");
        assert_eq!(company.display_name.as_deref(), Some("Acme"));
        assert_eq!(company.legal_name.as_deref(), Some("Acme Holdings LLC"));

        let directory = client.employee_directory().await.expect("directory");
        assert_eq!(directory.fields.len(), 1);
        assert_eq!(directory.employees.len(), 2);
        assert_eq!(directory.employees[0].id.as_deref(), Some("4521"));
        assert_eq!(directory.employees[0].job_title.as_deref(), Some("Data Analyst"));
        assert_eq!(directory.employees[1].id.as_deref(), Some("77"));
        assert!(directory.employees[1].work_email.is_none());

        let webhooks = client.webhooks().await.expect("webhooks");
        assert_eq!(
            webhooks,
            vec![WebhookSummary {
                id: Some("12".to_string()),
                name: Some("Pay rate changes".to_string()),
                url: Some("https://hooks.acme.test/pay".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn timesheet_entries_send_the_date_range_and_employee_filter() {
        let router = Router::new().route("/api/v1/time_tracking/timesheet_entries", echo_query());
        let client = client(serve(router).await);
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date");
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).expect("valid date");

        let filtered = client
            .timesheet_entries(start, end, &[4521, 77])
            .await
            .expect("entries");
        assert_eq!(
            filtered["query"],
            "start=2025-01-01&end=2025-01-31&employeeIds=4521%2C77"
        );

        let everyone = client.timesheet_entries(start, end, &[]).await.expect("entries");
        assert_eq!(everyone["query"], "start=2025-01-01&end=2025-01-31");
    }

    #[tokio::test]
    async fn raw_lookups_pass_the_body_through_and_surface_status_errors() {
        let router = Router::new()
            .route(
                "/api/v1/time_tracking/projects",
                get(|| async { Json(json!([{ "id": 1, "name": "Onboarding" }])) }),
            )
            .route(
                "/api/v1/datasets",
                get(|| async { (StatusCode::FORBIDDEN, "insufficient permissions") }),
            );
        let client = client(serve(router).await);

        let projects = client.time_tracking_projects().await.expect("projects");
        assert_eq!(projects[0]["name"], "Onboarding");

        let err = client.datasets().await.expect_err("forbidden");
        assert_eq!(err.status(), Some(403));
        assert!(err.to_string().contains("insufficient permissions"));
    }

    #[test]
    fn file_id_is_optional_in_upload_response() {
        assert_eq!(file_id_from_body(r#"{"id": 981}"#).as_deref(), Some("981"));
        assert_eq!(file_id_from_body(""), None);
        assert_eq!(file_id_from_body("<ok/>"), None);
    }
}
