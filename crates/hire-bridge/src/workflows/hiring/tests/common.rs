use std::sync::Arc;

use axum::response::Response;
use serde_json::{json, Value};

use crate::config::{BambooHrConfig, HiringConfig};
use crate::integrations::bamboohr::MetaList;
use crate::integrations::teamtailor::CustomFieldOwner;
use crate::integrations::teamtailor::CustomFieldValue;
use crate::workflows::fakes::{FakeAts, FakeHris};
use crate::workflows::hiring::{HireProvisioningService, ProvisioningSettings};

pub(super) const CV_URL: &str = "https://files.teamtailor.test/uploads/cv.pdf";
pub(super) const PORTFOLIO_URL: &str = "https://files.teamtailor.test/uploads/portfolio";
pub(super) const OTHER_URL: &str = "https://files.teamtailor.test/uploads/someone-else.pdf";

pub(super) fn settings(test_mode: bool) -> ProvisioningSettings {
    ProvisioningSettings {
        hiring: HiringConfig {
            test_mode,
            salary_currency: "USD".to_string(),
            default_location: "Remote".to_string(),
            staging_dir: None,
        },
        bamboohr: BambooHrConfig {
            company_domain: "acme".to_string(),
            api_key: "bamboo-key".to_string(),
            base_url: "https://api.bamboohr.test/api/gateway.php/acme/v1".to_string(),
            upload_category: "16".to_string(),
        },
        salary_field_id: "75235".to_string(),
    }
}

pub(super) fn hire_event() -> Value {
    json!({
        "event_name": "job_application.update",
        "stage_name": "Hired",
        "id": 5501,
        "job_id": "42",
        "job_title": "Data Analyst",
        "updated_at": "2025-02-10T09:00:00Z",
        "candidate": {
            "id": 7,
            "first_name": "Olena",
            "last_name": "Koval",
            "email": "olena@example.org",
            "phone": "+380501112233",
            "updated_at": "2025-03-03T10:15:00Z"
        }
    })
}

pub(super) fn hire_payload() -> Value {
    json!({ "body": hire_event() })
}

fn requisition() -> Value {
    json!({
        "id": "991",
        "type": "requisitions",
        "attributes": {
            "job-title": "Data Analyst",
            "custom-form-answers": { "team": "Growth", "level_of_candidate": "Senior" }
        },
        "relationships": {
            "department": {
                "links": { "related": "https://api.teamtailor.test/v1/requisitions/991/department" }
            }
        }
    })
}

fn upload(id: &str, url: &str, file_name: Option<&str>, candidate: Option<&str>) -> Value {
    let mut relationships = json!({});
    if let Some(candidate) = candidate {
        relationships["candidate"] = json!({ "data": { "id": candidate, "type": "candidates" } });
    }
    json!({
        "id": id,
        "type": "uploads",
        "attributes": { "url": url, "file-name": file_name },
        "relationships": relationships
    })
}

pub(super) fn ats() -> FakeAts {
    let mut ats = FakeAts {
        requisition: Some(requisition()),
        department: Some(json!({
            "id": "12",
            "type": "departments",
            "attributes": { "name": "Engineering" }
        })),
        uploads: vec![
            upload("1", CV_URL, Some("cv.pdf"), Some("7")),
            upload("2", PORTFOLIO_URL, None, None),
            upload("3", OTHER_URL, Some("other.pdf"), Some("8")),
        ],
        ..FakeAts::default()
    };
    ats.files.insert(CV_URL.to_string(), b"%PDF-cv".to_vec());
    ats.files.insert(PORTFOLIO_URL.to_string(), b"portfolio".to_vec());
    ats.files.insert(OTHER_URL.to_string(), b"%PDF-other".to_vec());
    ats.with_custom_fields(
        7,
        CustomFieldOwner::Candidate,
        vec![CustomFieldValue {
            field_id: Some("75235".to_string()),
            field_name: Some("Salary".to_string()),
            value: "$65,000".to_string(),
        }],
    )
}

pub(super) fn meta_lists() -> Vec<MetaList> {
    serde_json::from_value(json!({
        "lists": [
            {
                "fieldId": 4, "alias": "department", "manageable": "yes", "name": "Department",
                "options": [{ "id": 1, "name": "Engineering", "archived": "no" }]
            },
            {
                "fieldId": 5, "alias": "division", "manageable": "yes", "name": "Division",
                "options": []
            },
            {
                "fieldId": 17, "alias": "jobTitle", "manageable": "yes", "name": "Job Title",
                "options": [{ "id": 3, "name": "Senior Data Analyst" }]
            }
        ]
    }))
    .map(|lists: MetaListsFixture| lists.lists)
    .expect("meta lists decode")
}

#[derive(serde::Deserialize)]
struct MetaListsFixture {
    lists: Vec<MetaList>,
}

pub(super) fn hris() -> FakeHris {
    FakeHris {
        meta_lists: meta_lists(),
        employee_id: Some(901),
        ..FakeHris::default()
    }
}

pub(super) fn build_service(
    ats: FakeAts,
    hris: FakeHris,
    test_mode: bool,
) -> (
    HireProvisioningService<FakeAts, FakeHris>,
    Arc<FakeAts>,
    Arc<FakeHris>,
) {
    let ats = Arc::new(ats);
    let hris = Arc::new(hris);
    let service = HireProvisioningService::new(ats.clone(), hris.clone(), settings(test_mode));
    (service, ats, hris)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
