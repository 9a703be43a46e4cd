use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use pledgeboard_core::drafts::{DonationDraft, DraftRepositoryTrait, DraftStatus, DraftTransition};
use pledgeboard_core::errors::{Error, Result};

use super::model::DonationDraftDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::events::load_event;
use crate::schema::donation_drafts;

const REVIEWABLE_STATUSES: [DraftStatus; 3] = [
    DraftStatus::Extracted,
    DraftStatus::NeedsManualEntry,
    DraftStatus::UnderReview,
];

pub struct DraftRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl DraftRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        DraftRepository { pool, writer }
    }
}

pub(crate) fn load_draft(conn: &mut SqliteConnection, draft_id: &str) -> Result<DonationDraft> {
    let row = donation_drafts::table
        .find(draft_id)
        .first::<DonationDraftDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| Error::not_found(format!("draft {draft_id}")))?;
    DonationDraft::try_from(row).into_core()
}

/// Overwrites a draft row, guarded by the version the caller read.
///
/// Only called from inside a writer job, after the domain rules have run
/// against the same transaction's view of the draft.
pub(crate) fn save_draft(
    conn: &mut SqliteConnection,
    draft: &DonationDraft,
    read_version: i64,
) -> Result<()> {
    let row = DonationDraftDB::try_from(draft).into_core()?;
    let updated = diesel::update(
        donation_drafts::table
            .filter(donation_drafts::id.eq(&draft.id))
            .filter(donation_drafts::version.eq(read_version)),
    )
    .set(&row)
    .execute(conn)
    .into_core()?;

    if updated == 0 {
        return Err(Error::ConfirmationConflict(format!(
            "draft {} changed concurrently",
            draft.id
        )));
    }
    Ok(())
}

#[async_trait]
impl DraftRepositoryTrait for DraftRepository {
    async fn create(&self, draft: DonationDraft) -> Result<DonationDraft> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<DonationDraft> {
                load_event(conn, &draft.event_id)?.ensure_active()?;
                let row = DonationDraftDB::try_from(&draft).into_core()?;
                diesel::insert_into(donation_drafts::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                load_draft(conn, &draft.id)
            })
            .await
    }

    async fn transition(
        &self,
        draft_id: &str,
        expected_version: i64,
        transition: DraftTransition,
    ) -> Result<DonationDraft> {
        let draft_id = draft_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<DonationDraft> {
                let current = load_draft(conn, &draft_id)?;
                let event = load_event(conn, &current.event_id)?;
                let next = transition.apply(&current, expected_version, &event, Utc::now())?;
                save_draft(conn, &next, current.version)?;
                load_draft(conn, &draft_id)
            })
            .await
    }

    fn get_by_id(&self, draft_id: &str) -> Result<DonationDraft> {
        let mut conn = get_connection(&self.pool)?;
        load_draft(&mut conn, draft_id)
    }

    fn list_reviewable(&self, event_id: &str) -> Result<Vec<DonationDraft>> {
        let mut conn = get_connection(&self.pool)?;
        let statuses: Vec<&str> = REVIEWABLE_STATUSES.iter().map(|s| s.as_str()).collect();
        donation_drafts::table
            .filter(donation_drafts::event_id.eq(event_id))
            .filter(donation_drafts::status.eq_any(statuses))
            .order((donation_drafts::created_at.asc(), donation_drafts::id.asc()))
            .load::<DonationDraftDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(|row| DonationDraft::try_from(row).map_err(Error::from))
            .collect()
    }
}
