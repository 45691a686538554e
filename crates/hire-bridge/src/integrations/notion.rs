//! Notion (workspace) gateway and property flattening.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::lenient::null_as_default;
use super::{build_client, check_status, decode_json, ApiError};
use crate::config::{HttpConfig, NotionConfig};

const NOTION_VERSION: &str = "2022-06-28";

/// A database page with its raw property objects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Map<String, Value>,
}

impl Page {
    /// Properties keyed `property_<snake_case name>` with plain values, the
    /// same "simplified" shape automation tools hand around.
    pub fn simplified(&self) -> BTreeMap<String, Value> {
        let mut simplified = BTreeMap::new();
        let mut title = None;

        for (name, property) in &self.properties {
            let value = property_value(property);
            if property.get("type").and_then(Value::as_str) == Some("title") {
                title = value.as_str().map(str::to_string);
            }
            simplified.insert(format!("property_{}", snake_case(name)), value);
        }

        simplified.insert("id".to_string(), Value::String(self.id.clone()));
        if let Some(title) = title.filter(|title| !title.trim().is_empty()) {
            simplified.insert("name".to_string(), Value::String(title.trim().to_string()));
        }
        simplified
    }

    /// Ids of the pages a relation property points at. `property` may be the
    /// display name or its `snake_case` key.
    pub fn relation_ids(&self, property: &str) -> Vec<String> {
        self.properties
            .iter()
            .find(|(name, _)| name.as_str() == property || snake_case(name) == property)
            .and_then(|(_, prop)| prop.get("relation"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
pub trait WorkspaceGateway: Send + Sync {
    async fn page(&self, page_id: &str) -> Result<Page, ApiError>;
}

/// reqwest-backed [`WorkspaceGateway`].
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
}

impl NotionClient {
    pub fn new(config: &NotionConfig, http: &HttpConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_token))
            .map_err(|err| ApiError::decode("notion configuration", err))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));

        Ok(Self {
            http: build_client(http, headers)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WorkspaceGateway for NotionClient {
    async fn page(&self, page_id: &str) -> Result<Page, ApiError> {
        let endpoint = format!("{}/pages/{}", self.base_url, page_id);
        debug!(%endpoint, "notion GET");
        let response = self
            .http
            .get(&endpoint)
            .send()
            .await
            .map_err(|source| ApiError::transport(&endpoint, source))?;
        let response = check_status(&endpoint, response, |status| status.is_success()).await?;
        decode_json(&endpoint, response).await
    }
}

/// Accept a page URL, a bare 32-hex id or a dashed UUID and return the
/// dashed form.
pub fn normalize_page_id(input: &str) -> Option<String> {
    let candidate = input.trim();
    let raw = if candidate.starts_with("http://") || candidate.starts_with("https://") {
        let path = candidate.split(['?', '#']).next().unwrap_or(candidate);
        last_hex_run(&path.replace('-', ""), 32)?
    } else {
        let compact: String = candidate.chars().filter(|c| *c != '-').collect();
        if compact.len() != 32 || !compact.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        compact
    };

    let raw = raw.to_lowercase();
    Some(format!(
        "{}-{}-{}-{}-{}",
        &raw[0..8],
        &raw[8..12],
        &raw[12..16],
        &raw[16..20],
        &raw[20..32]
    ))
}

fn last_hex_run(text: &str, len: usize) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut end = chars.len();
    while end >= len {
        let mut start = end;
        while start > 0 && chars[start - 1].is_ascii_hexdigit() {
            start -= 1;
        }
        if end - start >= len {
            return Some(chars[end - len..end].iter().collect());
        }
        if start == 0 {
            break;
        }
        end = start - 1;
    }
    None
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

fn plain_text(rich_text: Option<&Value>) -> String {
    rich_text
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("plain_text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn names(items: Option<&Value>, key: &str) -> Value {
    let names = items
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get(key).cloned())
                .filter(|value| !value.is_null())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    Value::Array(names)
}

/// Reduce a Notion property object to a plain JSON value.
pub fn property_value(property: &Value) -> Value {
    let kind = property.get("type").and_then(Value::as_str).unwrap_or_default();
    let inner = property.get(kind);

    match kind {
        "title" | "rich_text" => Value::String(plain_text(inner)),
        "select" | "status" => inner
            .and_then(|select| select.get("name"))
            .cloned()
            .unwrap_or(Value::Null),
        "multi_select" => names(inner, "name"),
        "date" => match inner {
            Some(date) if date.is_object() => {
                let mut out = Map::new();
                for key in ["start", "end", "time_zone"] {
                    out.insert(key.to_string(), date.get(key).cloned().unwrap_or(Value::Null));
                }
                Value::Object(out)
            }
            _ => Value::Null,
        },
        "people" => Value::Array(
            inner
                .and_then(Value::as_array)
                .map(|people| {
                    people
                        .iter()
                        .filter_map(|person| {
                            person
                                .get("name")
                                .filter(|name| !name.is_null())
                                .or_else(|| person.get("person").and_then(|p| p.get("email")))
                                .cloned()
                        })
                        .collect()
                })
                .unwrap_or_default(),
        ),
        "checkbox" => Value::Bool(inner.and_then(Value::as_bool).unwrap_or(false)),
        "files" => names(inner, "name"),
        "relation" => names(inner, "id"),
        "created_by" | "last_edited_by" => inner
            .and_then(|user| user.get("name"))
            .cloned()
            .unwrap_or(Value::Null),
        "formula" => inner
            .and_then(|formula| {
                let formula_kind = formula.get("type")?.as_str()?;
                formula.get(formula_kind).cloned()
            })
            .unwrap_or(Value::Null),
        _ => inner.cloned().unwrap_or(Value::Null),
    }
}
