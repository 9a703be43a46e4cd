use log::{debug, warn};
use std::sync::Arc;

use super::drafts_model::{DonationDraft, DraftTransition, OpenedDraft};
use super::drafts_traits::{DraftRepositoryTrait, ReviewQueueServiceTrait};
use super::editor_sessions::EditorSessions;
use crate::errors::Result;
use crate::lifecycle::EventRepositoryTrait;
use crate::validation::require_editor_id;

/// Review queue over stored drafts.
pub struct ReviewQueueService {
    draft_repository: Arc<dyn DraftRepositoryTrait>,
    event_repository: Arc<dyn EventRepositoryTrait>,
    sessions: Arc<EditorSessions>,
}

impl ReviewQueueService {
    pub fn new(
        draft_repository: Arc<dyn DraftRepositoryTrait>,
        event_repository: Arc<dyn EventRepositoryTrait>,
        sessions: Arc<EditorSessions>,
    ) -> Self {
        Self {
            draft_repository,
            event_repository,
            sessions,
        }
    }
}

#[async_trait::async_trait]
impl ReviewQueueServiceTrait for ReviewQueueService {
    async fn open_draft(
        &self,
        draft_id: &str,
        expected_version: i64,
        editor_id: &str,
    ) -> Result<OpenedDraft> {
        let editor = require_editor_id(editor_id)?;
        let editor_id = editor.as_str();

        // Fast-fail before queueing a write.
        let draft = self.draft_repository.get_by_id(draft_id)?;
        draft.ensure_actionable(expected_version)?;
        self.event_repository
            .get_by_id(&draft.event_id)?
            .ensure_active()?;

        let opened = self
            .draft_repository
            .transition(
                draft_id,
                expected_version,
                DraftTransition::Open {
                    editor_id: editor_id.to_string(),
                },
            )
            .await?;

        let released_draft_id = self.sessions.open(editor_id, draft_id);
        if let Some(released) = &released_draft_id {
            warn!(
                "Editor {} opened draft {} while draft {} was still open; releasing it",
                editor_id, draft_id, released
            );
        }
        debug!(
            "Draft {} opened by {} at version {}",
            draft_id, editor_id, opened.version
        );

        Ok(OpenedDraft {
            draft: opened,
            released_draft_id,
        })
    }

    async fn reject_draft(
        &self,
        draft_id: &str,
        expected_version: i64,
        editor_id: &str,
        reason: Option<String>,
    ) -> Result<DonationDraft> {
        let editor_id = require_editor_id(editor_id)?;
        let draft = self.draft_repository.get_by_id(draft_id)?;
        draft.ensure_actionable(expected_version)?;

        let rejected = self
            .draft_repository
            .transition(
                draft_id,
                expected_version,
                DraftTransition::Reject {
                    editor_id: editor_id.clone(),
                    reason: reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
                },
            )
            .await?;
        self.sessions.release_draft(draft_id);
        debug!("Draft {} rejected by {}", draft_id, editor_id);
        Ok(rejected)
    }

    fn get_draft(&self, draft_id: &str) -> Result<DonationDraft> {
        self.draft_repository.get_by_id(draft_id)
    }

    fn list_review_queue(&self, event_id: &str) -> Result<Vec<DonationDraft>> {
        self.event_repository.get_by_id(event_id)?;
        self.draft_repository.list_reviewable(event_id)
    }
}
