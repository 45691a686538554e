//! JSON:API shapes returned by TeamTailor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::integrations::lenient::{null_as_default, optional_string_id, scalar_to_string, text_value};

/// Top-level JSON:API document.
#[derive(Debug, Clone, Deserialize)]
pub struct Document<T> {
    pub data: T,
    #[serde(default, deserialize_with = "null_as_default")]
    pub included: Vec<Resource<Value>>,
}

/// A single JSON:API resource object with typed attributes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Default"))]
pub struct Resource<A> {
    #[serde(default, deserialize_with = "optional_string_id")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: A,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationships: BTreeMap<String, Relationship>,
}

impl<A> Resource<A> {
    /// `relationships.<name>.links.related`
    pub fn related_link(&self, name: &str) -> Option<&str> {
        self.relationships
            .get(name)
            .and_then(|relationship| relationship.links.as_ref())
            .and_then(|links| links.related.as_deref())
            .filter(|link| !link.trim().is_empty())
    }

    /// `relationships.<name>.data.id` for to-one relationships.
    pub fn related_id(&self, name: &str) -> Option<String> {
        self.relationships
            .get(name)
            .and_then(|relationship| relationship.data.as_ref())
            .and_then(|data| data.get("id"))
            .and_then(scalar_to_string)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Relationship {
    #[serde(default)]
    pub links: Option<RelationshipLinks>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RelationshipLinks {
    #[serde(default)]
    pub related: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RequisitionAttributes {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_form_answers: Map<String, Value>,
}

impl RequisitionAttributes {
    /// Custom form answer rendered as text; blanks are treated as missing.
    pub fn answer(&self, key: &str) -> Option<String> {
        self.custom_form_answers.get(key).and_then(text_value)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DepartmentAttributes {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct UploadAttributes {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CustomFieldValueAttributes {
    #[serde(default)]
    pub(crate) value: Option<Value>,
}

/// A custom field value joined with the name of its field definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomFieldValue {
    pub field_id: Option<String>,
    pub field_name: Option<String>,
    pub value: String,
}

/// Flatten a `custom-field-values?include=custom-field` document. Empty
/// values are dropped.
pub(crate) fn join_custom_field_values(
    document: Document<Vec<Resource<CustomFieldValueAttributes>>>,
) -> Vec<CustomFieldValue> {
    let names: BTreeMap<String, String> = document
        .included
        .iter()
        .filter(|item| item.kind.as_deref() == Some("custom-fields"))
        .filter_map(|item| {
            let id = item.id.clone()?;
            let name = item.attributes.get("name").and_then(scalar_to_string)?;
            Some((id, name))
        })
        .collect();

    document
        .data
        .iter()
        .filter_map(|item| {
            let value = item.attributes.value.as_ref().and_then(text_value)?;
            let field_id = item.related_id("custom-field");
            let field_name = field_id.as_ref().and_then(|id| names.get(id).cloned());
            Some(CustomFieldValue {
                field_id,
                field_name,
                value,
            })
        })
        .collect()
}
