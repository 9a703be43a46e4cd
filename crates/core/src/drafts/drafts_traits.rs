//! Draft repository and review queue traits.

use async_trait::async_trait;

use super::drafts_model::{DonationDraft, DraftTransition, OpenedDraft};
use crate::errors::Result;

/// Persistence contract for donation drafts.
#[async_trait]
pub trait DraftRepositoryTrait: Send + Sync {
    /// Stores a new draft. Fails with `EventClosed` if its event has stopped
    /// by the time the write runs.
    async fn create(&self, draft: DonationDraft) -> Result<DonationDraft>;

    /// Applies a reviewer transition atomically against the stored draft
    /// and its event.
    async fn transition(
        &self,
        draft_id: &str,
        expected_version: i64,
        transition: DraftTransition,
    ) -> Result<DonationDraft>;

    fn get_by_id(&self, draft_id: &str) -> Result<DonationDraft>;

    /// Reviewable drafts of an event, oldest first.
    fn list_reviewable(&self, event_id: &str) -> Result<Vec<DonationDraft>>;
}

#[async_trait]
pub trait ReviewQueueServiceTrait: Send + Sync {
    /// Opens a draft for an editor. The editor must present the current
    /// version; opening bumps it.
    async fn open_draft(
        &self,
        draft_id: &str,
        expected_version: i64,
        editor_id: &str,
    ) -> Result<OpenedDraft>;

    async fn reject_draft(
        &self,
        draft_id: &str,
        expected_version: i64,
        editor_id: &str,
        reason: Option<String>,
    ) -> Result<DonationDraft>;

    fn get_draft(&self, draft_id: &str) -> Result<DonationDraft>;

    fn list_review_queue(&self, event_id: &str) -> Result<Vec<DonationDraft>>;
}
