//! JSON:API body for TeamTailor's `requisitions` endpoint.

use serde_json::{json, Map, Value};

use super::draft::RequisitionDraft;

pub const REQUISITION_CURRENCY: &str = "USD";

/// ISO code for the countries hiring requests name; other labels pass through.
pub fn iso_country(label: &str) -> String {
    match label {
        "Ukraine" => "UA",
        "Poland" => "PL",
        "Germany" => "DE",
        "United States" => "US",
        other => other,
    }
    .to_string()
}

pub fn requisition_payload(draft: &RequisitionDraft, location_id: &str) -> Value {
    let (min_salary, max_salary) = draft.salary_bounds();

    let mut relationships = Map::new();
    relationships.insert("location".to_string(), relation(location_id, "locations"));
    for (name, id, kind) in [
        ("department", &draft.department_id, "departments"),
        ("role", &draft.role_id, "roles"),
        ("user", &draft.user_id, "users"),
    ] {
        if let Some(id) = id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            relationships.insert(name.to_string(), relation(id, kind));
        }
    }

    let mut data = Map::new();
    data.insert("type".to_string(), json!("requisitions"));
    if let Some(id) = &draft.requisition_id {
        data.insert("id".to_string(), json!(id));
    }
    data.insert(
        "attributes".to_string(),
        json!({
            "job-title": draft.job_title,
            "job-description": draft.job_description,
            "country": iso_country(&draft.country),
            "min-salary": min_salary.map(number),
            "max-salary": max_salary.map(number),
            "currency": REQUISITION_CURRENCY,
            "salary-time-unit": draft.salary_period.to_lowercase(),
            "number-of-openings": draft.number_of_openings.map(number),
            "custom-form-answers": {
                "desire_start_day": draft.desire_start_day,
                "priority_of_position": draft.priority_of_position,
                "level_of_candidate": draft.level_of_candidate,
                "team": draft.team_name,
                "reason": draft.reason,
                "will_there_be_a_test_task": draft.will_there_be_a_test_task,
                "please_define_hiring_stages": draft.hiring_stages,
                "key_competencies_for_position": draft.key_competencies,
                "additional_comments_for_recruiter_or_approval": draft.additional_comments,
            },
            "status": "pending",
        }),
    );
    data.insert("relationships".to_string(), Value::Object(relationships));

    json!({ "data": data })
}

fn relation(id: &str, kind: &str) -> Value {
    json!({ "data": { "id": id, "type": kind } })
}

/// Whole numbers go out as integers.
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RequisitionDraft {
        RequisitionDraft {
            page_id: "page-1".to_string(),
            job_title: "Data Analyst".to_string(),
            country: "Poland".to_string(),
            min_salary: Some(2500.0),
            max_salary: Some(3500.5),
            salary_period: "Month".to_string(),
            number_of_openings: Some(2.0),
            reason: "Growth".to_string(),
            department_id: Some("12".to_string()),
            team_name: Some("Growth".to_string()),
            ..RequisitionDraft::default()
        }
    }

    #[test]
    fn maps_known_countries() {
        assert_eq!(iso_country("Ukraine"), "UA");
        assert_eq!(iso_country("United States"), "US");
        assert_eq!(iso_country("Portugal"), "Portugal");
        assert_eq!(iso_country(""), "");
    }

    #[test]
    fn new_requisition_has_no_id() {
        let payload = requisition_payload(&draft(), "1200146");
        let data = &payload["data"];

        assert_eq!(data["type"], "requisitions");
        assert!(data.get("id").is_none());
        let attributes = &data["attributes"];
        assert_eq!(attributes["country"], "PL");
        assert_eq!(attributes["min-salary"], json!(2500));
        assert_eq!(attributes["max-salary"], json!(3500.5));
        assert_eq!(attributes["salary-time-unit"], "month");
        assert_eq!(attributes["number-of-openings"], json!(2));
        assert_eq!(attributes["currency"], "USD");
        assert_eq!(attributes["status"], "pending");
        assert_eq!(attributes["custom-form-answers"]["team"], "Growth");
        assert_eq!(attributes["custom-form-answers"]["desire_start_day"], Value::Null);

        let relationships = &data["relationships"];
        assert_eq!(relationships["location"]["data"]["id"], "1200146");
        assert_eq!(relationships["department"]["data"]["type"], "departments");
        assert!(relationships.get("role").is_none());
        assert!(relationships.get("user").is_none());
    }

    #[test]
    fn update_carries_the_existing_id() {
        let mut draft = draft();
        draft.requisition_id = Some("8800".to_string());
        draft.user_id = Some("55".to_string());

        let payload = requisition_payload(&draft, "1200146");
        assert_eq!(payload["data"]["id"], "8800");
        assert_eq!(payload["data"]["relationships"]["user"]["data"]["id"], "55");
    }
}
