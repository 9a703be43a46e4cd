use async_trait::async_trait;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use pledgeboard_core::errors::{Error, Result};
use pledgeboard_core::ledger::{
    CommittedEntry, ConfirmedDonation, LedgerAggregate, LedgerEntry, LedgerEntryKind,
    LedgerRepositoryTrait, NewConfirmation, NewReversal,
};

use super::model::{entry_from_rows, DonationDB, LedgerEntryDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::drafts::{load_draft, save_draft};
use crate::errors::IntoCore;
use crate::events::load_event;
use crate::schema::{donations, ledger_entries};

pub struct LedgerRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl LedgerRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        LedgerRepository { pool, writer }
    }
}

/// Next seq for an event. Only meaningful inside a writer job, where no
/// other append can interleave.
fn next_seq(conn: &mut SqliteConnection, event_id: &str) -> Result<i64> {
    let current: Option<i64> = ledger_entries::table
        .filter(ledger_entries::event_id.eq(event_id))
        .select(max(ledger_entries::seq))
        .first(conn)
        .into_core()?;
    Ok(current.unwrap_or(0) + 1)
}

pub(crate) fn load_entries(
    conn: &mut SqliteConnection,
    event_id: &str,
    after_seq: i64,
) -> Result<Vec<LedgerEntry>> {
    ledger_entries::table
        .inner_join(donations::table)
        .filter(ledger_entries::event_id.eq(event_id))
        .filter(ledger_entries::seq.gt(after_seq))
        .order(ledger_entries::seq.asc())
        .select((LedgerEntryDB::as_select(), DonationDB::as_select()))
        .load::<(LedgerEntryDB, DonationDB)>(conn)
        .into_core()?
        .into_iter()
        .map(|(entry, donation)| entry_from_rows(entry, donation).into_core())
        .collect()
}

/// Re-reads the appended entry and the event totals on the writer's
/// connection, before the transaction commits.
fn committed_entry(
    conn: &mut SqliteConnection,
    event_id: &str,
    seq: i64,
) -> Result<CommittedEntry> {
    let goal = load_event(conn, event_id)?.goal_amount;
    let entries = load_entries(conn, event_id, 0)?;
    let aggregate = LedgerAggregate::from_entries(event_id, goal, &entries);
    let entry = entries
        .into_iter()
        .find(|e| e.seq == seq)
        .ok_or_else(|| Error::not_found(format!("ledger entry {seq} of event {event_id}")))?;
    Ok(CommittedEntry { entry, aggregate })
}

fn insert_entry(conn: &mut SqliteConnection, entry: &LedgerEntry) -> Result<()> {
    diesel::insert_into(ledger_entries::table)
        .values(LedgerEntryDB::from(entry))
        .execute(conn)
        .into_core()?;
    Ok(())
}

#[async_trait]
impl LedgerRepositoryTrait for LedgerRepository {
    async fn append_confirmation(&self, confirmation: NewConfirmation) -> Result<CommittedEntry> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CommittedEntry> {
                let draft = load_draft(conn, &confirmation.draft_id)?;
                draft.ensure_actionable(confirmation.expected_version)?;
                load_event(conn, &draft.event_id)?.ensure_active()?;

                let event_id = draft.event_id.clone();
                let seq = next_seq(conn, &event_id)?;
                let donation = ConfirmedDonation {
                    id: confirmation.donation_id.clone(),
                    event_id: event_id.clone(),
                    donor_name: confirmation.donor_name,
                    amount: confirmation.amount,
                    confirmed_at: confirmation.confirmed_at,
                    editor_id: confirmation.editor_id.clone(),
                    origin_draft_id: draft.id.clone(),
                };
                diesel::insert_into(donations::table)
                    .values(DonationDB::from(&donation))
                    .execute(conn)
                    .into_core()?;
                insert_entry(
                    conn,
                    &LedgerEntry {
                        seq,
                        event_id: event_id.clone(),
                        kind: LedgerEntryKind::Donation,
                        donation,
                        reverses_entry_seq: None,
                        recorded_by: confirmation.editor_id.clone(),
                        reason: None,
                        recorded_at: confirmation.confirmed_at,
                    },
                )?;

                let read_version = draft.version;
                let confirmed = draft.confirmed_as(
                    &confirmation.donation_id,
                    &confirmation.editor_id,
                    confirmation.confirmed_at,
                );
                save_draft(conn, &confirmed, read_version)?;

                debug!("Appended donation seq {} to event {}", seq, event_id);
                committed_entry(conn, &event_id, seq)
            })
            .await
    }

    async fn append_reversal(&self, reversal: NewReversal) -> Result<CommittedEntry> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CommittedEntry> {
                load_event(conn, &reversal.event_id)?.ensure_active()?;

                let original = ledger_entries::table
                    .inner_join(donations::table)
                    .filter(ledger_entries::event_id.eq(&reversal.event_id))
                    .filter(ledger_entries::donation_id.eq(&reversal.donation_id))
                    .filter(ledger_entries::kind.eq(LedgerEntryKind::Donation.as_str()))
                    .select((LedgerEntryDB::as_select(), DonationDB::as_select()))
                    .first::<(LedgerEntryDB, DonationDB)>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| Error::not_found(format!("donation {}", reversal.donation_id)))
                    .and_then(|(entry, donation)| entry_from_rows(entry, donation).into_core())?;

                let already_reversed: i64 = ledger_entries::table
                    .filter(ledger_entries::donation_id.eq(&reversal.donation_id))
                    .filter(ledger_entries::kind.eq(LedgerEntryKind::Reversal.as_str()))
                    .count()
                    .get_result(conn)
                    .into_core()?;
                if already_reversed > 0 {
                    return Err(Error::ConfirmationConflict(format!(
                        "donation {} is already reversed",
                        reversal.donation_id
                    )));
                }

                let seq = next_seq(conn, &reversal.event_id)?;
                insert_entry(
                    conn,
                    &LedgerEntry {
                        seq,
                        kind: LedgerEntryKind::Reversal,
                        reverses_entry_seq: Some(original.seq),
                        recorded_by: reversal.editor_id,
                        reason: reversal.reason,
                        recorded_at: reversal.recorded_at,
                        ..original
                    },
                )?;

                debug!(
                    "Appended reversal seq {} to event {}",
                    seq, reversal.event_id
                );
                committed_entry(conn, &reversal.event_id, seq)
            })
            .await
    }

    fn list_entries(&self, event_id: &str) -> Result<Vec<LedgerEntry>> {
        self.entries_since(event_id, 0)
    }

    fn entries_since(&self, event_id: &str, after_seq: i64) -> Result<Vec<LedgerEntry>> {
        let mut conn = get_connection(&self.pool)?;
        load_entries(&mut conn, event_id, after_seq)
    }

    fn get_donation(&self, donation_id: &str) -> Result<ConfirmedDonation> {
        let mut conn = get_connection(&self.pool)?;
        let row = donations::table
            .find(donation_id)
            .first::<DonationDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::not_found(format!("donation {donation_id}")))?;
        ConfirmedDonation::try_from(row).into_core()
    }
}
