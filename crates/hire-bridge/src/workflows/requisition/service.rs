use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::draft::RequisitionDraft;
use super::payload::requisition_payload;
use crate::integrations::lenient::text_value;
use crate::integrations::notion::{normalize_page_id, Page, WorkspaceGateway};
use crate::integrations::teamtailor::AtsGateway;
use crate::integrations::ApiError;

/// A draft and the body that would be sent for it.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedRequisition {
    pub draft: RequisitionDraft,
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub requisition_id: String,
    pub created: bool,
    pub payload: Value,
}

/// Pushes Notion hiring requests to TeamTailor as requisitions.
pub struct RequisitionSync<W, A> {
    workspace: Arc<W>,
    ats: Arc<A>,
    location_id: String,
}

impl<W, A> RequisitionSync<W, A>
where
    W: WorkspaceGateway + 'static,
    A: AtsGateway + 'static,
{
    pub fn new(workspace: Arc<W>, ats: Arc<A>, location_id: impl Into<String>) -> Self {
        Self {
            workspace,
            ats,
            location_id: location_id.into(),
        }
    }

    /// Read the page and its related pages and assemble the request body.
    pub async fn prepare(
        &self,
        page_ref: &str,
        user_id: Option<&str>,
    ) -> Result<PreparedRequisition, RequisitionError> {
        let page_id = normalize_page_id(page_ref)
            .ok_or_else(|| RequisitionError::InvalidPageId(page_ref.to_string()))?;
        let page = self
            .workspace
            .page(&page_id)
            .await
            .map_err(RequisitionError::Workspace)?;

        let mut draft = RequisitionDraft::from_simplified(&page.simplified());
        draft.department_id = self
            .related_text(&page, "department", "property_tt_department_id")
            .await;
        draft.role_id = self.related_text(&page, "role", "property_tt_role_id").await;
        draft.team_name = self.related_text(&page, "team", "name").await;
        draft.user_id = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let payload = requisition_payload(&draft, &self.location_id);
        Ok(PreparedRequisition { draft, payload })
    }

    /// Create the requisition, or update it when the page already knows its id.
    pub async fn sync(
        &self,
        page_ref: &str,
        user_id: Option<&str>,
    ) -> Result<SyncOutcome, RequisitionError> {
        let prepared = self.prepare(page_ref, user_id).await?;
        let existing = prepared.draft.requisition_id.as_deref();

        let requisition_id = self
            .ats
            .save_requisition(&prepared.payload, existing)
            .await
            .map_err(RequisitionError::Ats)?;
        info!(
            %requisition_id,
            page_id = %prepared.draft.page_id,
            created = existing.is_none(),
            "requisition saved"
        );

        Ok(SyncOutcome {
            requisition_id,
            created: existing.is_none(),
            payload: prepared.payload,
        })
    }

    /// `key` on the first page the `relation` property links to.
    async fn related_text(&self, page: &Page, relation: &str, key: &str) -> Option<String> {
        let related_id = page.relation_ids(relation).into_iter().next()?;
        match self.workspace.page(&related_id).await {
            Ok(related) => related.simplified().get(key).and_then(text_value),
            Err(err) => {
                warn!(%relation, %related_id, error = %err, "related page unavailable");
                None
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequisitionError {
    #[error("'{0}' is not a Notion page URL or id")]
    InvalidPageId(String),
    #[error("failed to read Notion page: {0}")]
    Workspace(#[source] ApiError),
    #[error("failed to save requisition: {0}")]
    Ats(#[source] ApiError),
}
