//! Ukrainian-language Slack notice for a pay-rate change.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use super::domain::CompensationChange;

const PROFILE_LINK_LABEL: &str = "Переглянути профіль працівника";
const NOT_FOUND: &str = "Не знайдено";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Changed,
    Unchanged,
    NewlySet,
}

impl ChangeKind {
    pub fn classify(previous: Option<&str>, new_rate: &str) -> Self {
        match previous {
            Some(previous) if previous == new_rate => ChangeKind::Unchanged,
            Some(_) => ChangeKind::Changed,
            None => ChangeKind::NewlySet,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChangeKind::Changed => "Зміна заробітної плати",
            ChangeKind::Unchanged => "Оновлення компенсації",
            ChangeKind::NewlySet => "Встановлення заробітної плати",
        }
    }

    fn emoji(self) -> &'static str {
        match self {
            ChangeKind::Unchanged => "ℹ️",
            ChangeKind::Changed | ChangeKind::NewlySet => "🔔",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeMetadata {
    pub employee_id: String,
    pub employee_name: String,
    pub previous_rate: Option<String>,
    pub new_rate: String,
    pub effective_date: String,
    pub change_reason: String,
    pub department: String,
    pub job_title: String,
    pub message_type: String,
    pub kind: ChangeKind,
    pub timestamp: DateTime<Utc>,
}

/// Rendered notice: plain `text`, Block Kit `blocks` and logging metadata.
#[derive(Debug, Clone, Serialize)]
pub struct PayRateNotice {
    pub text: String,
    pub blocks: Vec<Value>,
    pub metadata: NoticeMetadata,
}

impl PayRateNotice {
    /// Body for a Slack incoming webhook.
    pub fn slack_message(&self) -> Value {
        json!({
            "text": self.text,
            "blocks": self.blocks,
        })
    }
}

pub fn employee_profile_link(company_domain: &str, employee_id: &str) -> String {
    format!("https://{company_domain}.bamboohr.com/employees/employee.php?id={employee_id}")
}

pub fn build_notice(
    change: &CompensationChange,
    previous_rate: Option<&str>,
    company_domain: &str,
    now: DateTime<Utc>,
) -> PayRateNotice {
    let kind = ChangeKind::classify(previous_rate, &change.new_pay_rate);
    let link = employee_profile_link(company_domain, &change.employee_id);
    let name = &change.employee_name;
    let new_rate = &change.new_pay_rate;

    let body = match (kind, previous_rate) {
        (ChangeKind::Changed, Some(previous)) => {
            format!("Зміна заробітної плати з *{previous}* на *{new_rate}* для *{name}*")
        }
        (ChangeKind::Unchanged, _) => {
            format!("Компенсація залишилася без змін: *{new_rate}* для *{name}*")
        }
        _ => format!("Встановлена заробітна плата *{new_rate}* для *{name}*"),
    };
    let message = format!(
        "{} {}\n{body}\n<{link}|{PROFILE_LINK_LABEL}>",
        kind.emoji(),
        kind.title()
    );

    let mut context = vec![
        mrkdwn(format!("📅 *Дата набуття чинності:* {}", change.effective_date)),
        mrkdwn(format!("📝 *Причина:* {}", change.change_reason)),
    ];
    let position: Vec<&str> = [change.department.as_str(), change.job_title.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    if !position.is_empty() {
        context.push(mrkdwn(format!("💼 *Посада:* {}", position.join(" - "))));
    }

    let mut blocks = vec![
        json!({ "type": "section", "text": mrkdwn(message.clone()) }),
        json!({ "type": "context", "elements": context }),
    ];
    if !change.comment.is_empty() {
        blocks.push(json!({
            "type": "section",
            "text": mrkdwn(format!("💬 *Коментар:* {}", change.comment)),
        }));
    }
    blocks.push(json!({ "type": "divider" }));
    blocks.push(json!({
        "type": "context",
        "elements": [mrkdwn(format!(
            "🔍 ID: {} | Попередня: {} | Час: {}",
            change.employee_id,
            previous_rate.unwrap_or(NOT_FOUND),
            now.format("%d.%m.%Y, %H:%M:%S UTC")
        ))],
    }));

    PayRateNotice {
        text: message.replace('*', ""),
        blocks,
        metadata: NoticeMetadata {
            employee_id: change.employee_id.clone(),
            employee_name: change.employee_name.clone(),
            previous_rate: previous_rate.map(str::to_string),
            new_rate: change.new_pay_rate.clone(),
            effective_date: change.effective_date.clone(),
            change_reason: change.change_reason.clone(),
            department: change.department.clone(),
            job_title: change.job_title.clone(),
            message_type: kind.title().to_string(),
            kind,
            timestamp: now,
        },
    }
}

fn mrkdwn(text: String) -> Value {
    json!({ "type": "mrkdwn", "text": text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn change() -> CompensationChange {
        CompensationChange {
            employee_id: "318".to_string(),
            employee_name: "Olena Koval".to_string(),
            new_pay_rate: "3500.00 USD".to_string(),
            effective_date: "2025-03-01".to_string(),
            change_reason: "Promotion".to_string(),
            comment: String::new(),
            department: "Engineering".to_string(),
            job_title: String::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 2, 8, 30, 0).unwrap()
    }

    #[test]
    fn changed_rate_mentions_both_amounts() {
        let notice = build_notice(&change(), Some("3000.00 USD"), "acme", now());

        assert_eq!(notice.metadata.kind, ChangeKind::Changed);
        assert_eq!(
            notice.text,
            "🔔 Зміна заробітної плати\n\
             Зміна заробітної плати з 3000.00 USD на 3500.00 USD для Olena Koval\n\
             <https://acme.bamboohr.com/employees/employee.php?id=318|Переглянути профіль працівника>"
        );
        assert_eq!(notice.blocks[0]["type"], "section");
        assert!(notice.blocks[0]["text"]["text"]
            .as_str()
            .unwrap()
            .contains("*3000.00 USD*"));
        assert_eq!(
            notice.blocks[1]["elements"][2]["text"],
            "💼 *Посада:* Engineering"
        );
        assert_eq!(notice.blocks[2]["type"], "divider");
        assert_eq!(
            notice.blocks[3]["elements"][0]["text"],
            "🔍 ID: 318 | Попередня: 3000.00 USD | Час: 02.03.2025, 08:30:00 UTC"
        );
    }

    #[test]
    fn unchanged_and_new_rates_use_their_own_wording() {
        let unchanged = build_notice(&change(), Some("3500.00 USD"), "acme", now());
        assert_eq!(unchanged.metadata.kind, ChangeKind::Unchanged);
        assert!(unchanged.text.starts_with("ℹ️ Оновлення компенсації"));
        assert!(unchanged.text.contains("Компенсація залишилася без змін: 3500.00 USD"));

        let newly_set = build_notice(&change(), None, "acme", now());
        assert_eq!(newly_set.metadata.kind, ChangeKind::NewlySet);
        assert!(newly_set.text.contains("Встановлена заробітна плата 3500.00 USD"));
        assert!(newly_set.blocks[3]["elements"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Попередня: Не знайдено"));
    }

    #[test]
    fn comment_gets_its_own_section() {
        let mut with_comment = change();
        with_comment.comment = "Annual review".to_string();
        with_comment.department = String::new();

        let notice = build_notice(&with_comment, None, "acme", now());
        assert_eq!(notice.blocks.len(), 5);
        assert_eq!(notice.blocks[1]["elements"].as_array().unwrap().len(), 2);
        assert_eq!(notice.blocks[2]["text"]["text"], "💬 *Коментар:* Annual review");

        let slack = notice.slack_message();
        assert_eq!(slack["text"], json!(notice.text));
        assert!(slack.get("metadata").is_none());
    }
}
