//! Ledger repository and service traits.

use async_trait::async_trait;

use super::ledger_model::{
    CommittedEntry, ConfirmedDonation, LedgerAggregate, LedgerEntry, LedgerSnapshot,
    NewConfirmation, NewReversal,
};
use crate::errors::Result;
use crate::export::ReportRow;

/// Persistence contract for the append-only ledger.
///
/// Both append operations are single serialized units: they re-check the
/// draft and event inside one write transaction, assign the next seq for the
/// event, and either commit everything or nothing. The returned aggregate is
/// read inside the same transaction.
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    /// Confirms a draft and appends its donation.
    ///
    /// Fails with `ConfirmationConflict` if the draft version moved or the
    /// draft is already terminal, and with `EventClosed` if the event stopped.
    async fn append_confirmation(&self, confirmation: NewConfirmation) -> Result<CommittedEntry>;

    /// Appends a reversal for a donation that has not been reversed yet.
    async fn append_reversal(&self, reversal: NewReversal) -> Result<CommittedEntry>;

    /// All entries of an event ordered by seq.
    fn list_entries(&self, event_id: &str) -> Result<Vec<LedgerEntry>>;

    /// Entries with `seq > after_seq`, ordered by seq.
    fn entries_since(&self, event_id: &str, after_seq: i64) -> Result<Vec<LedgerEntry>>;

    fn get_donation(&self, donation_id: &str) -> Result<ConfirmedDonation>;
}

pub trait LedgerServiceTrait: Send + Sync {
    fn aggregate(&self, event_id: &str) -> Result<LedgerAggregate>;

    fn snapshot(&self, event_id: &str) -> Result<LedgerSnapshot>;

    fn entries_since(&self, event_id: &str, after_seq: i64) -> Result<Vec<LedgerEntry>>;

    /// Rows for the final report: live donations in seq order.
    fn export_rows(&self, event_id: &str) -> Result<Vec<ReportRow>>;
}
