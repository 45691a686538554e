use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::integrations::lenient::text_value;

/// Requisition fields read from a Notion hiring-request page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequisitionDraft {
    pub page_id: String,
    /// Set once the page has been pushed to TeamTailor before.
    pub requisition_id: Option<String>,
    pub job_title: String,
    pub job_description: String,
    pub country: String,
    pub need_salary_range: Option<bool>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub fixed_salary: Option<f64>,
    pub salary_period: String,
    pub number_of_openings: Option<f64>,
    pub desire_start_day: Option<String>,
    pub priority_of_position: Option<Value>,
    pub level_of_candidate: Option<Value>,
    pub reason: String,
    pub will_there_be_a_test_task: Option<Value>,
    pub hiring_stages: String,
    pub key_competencies: String,
    pub additional_comments: String,
    pub department_id: Option<String>,
    pub role_id: Option<String>,
    pub team_name: Option<String>,
    pub user_id: Option<String>,
}

impl RequisitionDraft {
    /// Read the page's own properties; related pages are resolved separately.
    pub fn from_simplified(page: &BTreeMap<String, Value>) -> Self {
        let text = |key: &str| page.get(key).and_then(text_value);
        let number = |key: &str| page.get(key).and_then(Value::as_f64);
        let raw = |key: &str| page.get(key).filter(|value| !value.is_null()).cloned();

        Self {
            page_id: text("id").unwrap_or_default(),
            requisition_id: text("property_tt_requisition_id"),
            job_title: text("property_name").unwrap_or_default(),
            job_description: text("property_job_description").unwrap_or_default(),
            country: text("property_country").unwrap_or_default(),
            need_salary_range: page
                .get("property_need_salary_range")
                .and_then(Value::as_bool),
            min_salary: number("property_min_salary"),
            max_salary: number("property_max_salary"),
            fixed_salary: number("property_fixed_salary"),
            salary_period: text("property_salary_period").unwrap_or_default(),
            number_of_openings: number("property_expected_number_of_hires"),
            desire_start_day: page
                .get("property_desire_start_day_of_newcomer")
                .and_then(|date| date.get("start"))
                .and_then(text_value),
            priority_of_position: raw("property_priority_of_position"),
            level_of_candidate: raw("property_level_of_candidate"),
            reason: text("property_reason").unwrap_or_default(),
            will_there_be_a_test_task: raw("property_will_there_be_a_test_task"),
            hiring_stages: text("property_please_define_hiring_stages").unwrap_or_default(),
            key_competencies: text("property_key_competencies_for_position").unwrap_or_default(),
            additional_comments: text(
                "property_additional_comments_for_recruiter_or_approval",
            )
            .unwrap_or_default(),
            department_id: None,
            role_id: None,
            team_name: None,
            user_id: None,
        }
    }

    /// `(min, max)` salary. A fixed salary `f` becomes `(f - 1, f)` because
    /// TeamTailor wants both bounds.
    pub fn salary_bounds(&self) -> (Option<f64>, Option<f64>) {
        if self.need_salary_range.unwrap_or(true) {
            (self.min_salary, self.max_salary)
        } else {
            match self.fixed_salary {
                Some(fixed) => (Some(fixed - 1.0), Some(fixed)),
                None => (None, None),
            }
        }
    }
}
