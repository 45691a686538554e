//! Reconciliation of employee values against BambooHR list fields.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::integrations::bamboohr::{EmployeeRecord, MetaList};

/// Employee fields that BambooHR backs with a picklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PicklistField {
    Department,
    Division,
    JobTitle,
}

impl PicklistField {
    pub const ALL: [PicklistField; 3] = [
        PicklistField::Department,
        PicklistField::Division,
        PicklistField::JobTitle,
    ];

    /// Lowercase alias BambooHR uses for the list.
    pub fn alias(self) -> &'static str {
        match self {
            PicklistField::Department => "department",
            PicklistField::Division => "division",
            PicklistField::JobTitle => "jobtitle",
        }
    }

    fn from_alias(alias: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.alias() == alias)
    }

    fn employee_value(self, employee: &EmployeeRecord) -> Option<&str> {
        let value = match self {
            PicklistField::Department => employee.department.as_deref(),
            PicklistField::Division => employee.division.as_deref(),
            PicklistField::JobTitle => Some(employee.job_title.as_str()),
        };
        value.map(str::trim).filter(|value| !value.is_empty())
    }
}

/// An option the employee needs that the list does not offer yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PicklistOption {
    pub field_name: PicklistField,
    pub field_id: u64,
    pub value: String,
}

/// Options the employee needs that their lists do not offer yet, in field order.
pub fn missing_options(
    employee: &EmployeeRecord,
    lists: &[MetaList],
) -> Vec<PicklistOption> {
    let mut mapped: BTreeMap<PicklistField, &MetaList> = BTreeMap::new();

    for list in lists.iter().filter(|list| list.is_manageable()) {
        if list.field_id.unwrap_or(0) == 0 {
            continue;
        }
        let alias = list.alias.as_deref().unwrap_or_default().to_lowercase();
        let name = list.name.as_deref().unwrap_or_default().to_lowercase();

        if let Some(field) = PicklistField::from_alias(&alias) {
            mapped.insert(field, list);
        } else if name == "job title" {
            mapped.entry(PicklistField::JobTitle).or_insert(list);
        }
    }

    mapped
        .into_iter()
        .filter_map(|(field, list)| {
            let field_id = list.field_id?;
            let value = field.employee_value(employee)?;
            (!list.has_option(value)).then(|| PicklistOption {
                field_name: field,
                field_id,
                value: value.to_string(),
            })
        })
        .collect()
}
