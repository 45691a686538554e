//! Salary lookup across TeamTailor custom fields.

use tracing::debug;

use crate::integrations::teamtailor::{AtsGateway, CustomFieldOwner, CustomFieldValue};

/// Field-name fragments that suggest a custom field holds pay information.
pub const SALARY_KEYWORDS: [&str; 8] = [
    "salary",
    "offer",
    "compensation",
    "pay",
    "wage",
    "rate",
    "annual",
    "hourly",
];

/// Search the dedicated salary field on the candidate, then on each job
/// application, then fall back to any field whose name looks salary-related.
pub async fn find_salary<A>(
    ats: &A,
    candidate_id: u64,
    job_application_ids: &[u64],
    salary_field_id: &str,
) -> Option<String>
where
    A: AtsGateway + ?Sized,
{
    let dedicated = std::iter::once((candidate_id, CustomFieldOwner::Candidate)).chain(
        job_application_ids
            .iter()
            .map(|id| (*id, CustomFieldOwner::JobApplication)),
    );
    let owners: Vec<(u64, CustomFieldOwner)> = dedicated.collect();

    for (owner_id, owner) in &owners {
        let values = lookup(ats, *owner_id, *owner, Some(salary_field_id)).await;
        if let Some(found) = values.into_iter().next() {
            return Some(found.value);
        }
    }

    for (owner_id, owner) in &owners {
        let values = lookup(ats, *owner_id, *owner, None).await;
        if let Some(found) = values.into_iter().find(looks_like_salary) {
            return Some(found.value);
        }
    }

    None
}

async fn lookup<A>(
    ats: &A,
    owner_id: u64,
    owner: CustomFieldOwner,
    field_id: Option<&str>,
) -> Vec<CustomFieldValue>
where
    A: AtsGateway + ?Sized,
{
    match ats.custom_field_values(owner_id, owner, field_id).await {
        Ok(values) => values,
        Err(err) => {
            debug!(owner_id, owner = owner.as_str(), error = %err, "custom field lookup failed");
            Vec::new()
        }
    }
}

fn looks_like_salary(value: &CustomFieldValue) -> bool {
    value.field_name.as_deref().is_some_and(|name| {
        let name = name.to_lowercase();
        SALARY_KEYWORDS.iter().any(|keyword| name.contains(keyword))
    })
}

/// Parse free-form salary text such as `"$50,000"`, `"€ 4 500"` or `"50k"`.
pub fn parse_salary(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ',' | ' '))
        .collect();

    let (number, multiplier) = match cleaned.strip_suffix(['k', 'K']) {
        Some(prefix) => (prefix, 1000.0),
        None => (cleaned.as_str(), 1.0),
    };

    number
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value * multiplier)
}
