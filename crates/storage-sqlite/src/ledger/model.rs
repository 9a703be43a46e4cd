//! Database models for donations and ledger entries.

use diesel::prelude::*;

use pledgeboard_core::ledger::{ConfirmedDonation, LedgerEntry, LedgerEntryKind};

use crate::errors::StorageError;
use crate::utils::{format_timestamp, parse_decimal, parse_enum, parse_timestamp};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::donations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DonationDB {
    pub id: String,
    pub event_id: String,
    pub donor_name: String,
    pub amount: String,
    pub confirmed_at: String,
    pub editor_id: String,
    pub origin_draft_id: String,
}

/// One row of the append-only ledger. Rows are never updated.
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::ledger_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LedgerEntryDB {
    pub event_id: String,
    pub seq: i64,
    pub kind: String,
    pub donation_id: String,
    pub reverses_entry_seq: Option<i64>,
    pub recorded_by: String,
    pub reason: Option<String>,
    pub recorded_at: String,
}

impl TryFrom<DonationDB> for ConfirmedDonation {
    type Error = StorageError;

    fn try_from(db: DonationDB) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: parse_decimal("donations.amount", &db.amount)?,
            confirmed_at: parse_timestamp("donations.confirmed_at", &db.confirmed_at)?,
            id: db.id,
            event_id: db.event_id,
            donor_name: db.donor_name,
            editor_id: db.editor_id,
            origin_draft_id: db.origin_draft_id,
        })
    }
}

impl From<&ConfirmedDonation> for DonationDB {
    fn from(domain: &ConfirmedDonation) -> Self {
        Self {
            id: domain.id.clone(),
            event_id: domain.event_id.clone(),
            donor_name: domain.donor_name.clone(),
            amount: domain.amount.to_string(),
            confirmed_at: format_timestamp(domain.confirmed_at),
            editor_id: domain.editor_id.clone(),
            origin_draft_id: domain.origin_draft_id.clone(),
        }
    }
}

impl From<&LedgerEntry> for LedgerEntryDB {
    fn from(domain: &LedgerEntry) -> Self {
        Self {
            event_id: domain.event_id.clone(),
            seq: domain.seq,
            kind: domain.kind.as_str().to_string(),
            donation_id: domain.donation.id.clone(),
            reverses_entry_seq: domain.reverses_entry_seq,
            recorded_by: domain.recorded_by.clone(),
            reason: domain.reason.clone(),
            recorded_at: format_timestamp(domain.recorded_at),
        }
    }
}

/// Rebuilds a domain entry from its row and the donation it refers to.
pub fn entry_from_rows(entry: LedgerEntryDB, donation: DonationDB) -> Result<LedgerEntry, StorageError> {
    Ok(LedgerEntry {
        kind: parse_enum::<LedgerEntryKind>("ledger_entries.kind", &entry.kind)?,
        recorded_at: parse_timestamp("ledger_entries.recorded_at", &entry.recorded_at)?,
        donation: ConfirmedDonation::try_from(donation)?,
        seq: entry.seq,
        event_id: entry.event_id,
        reverses_entry_seq: entry.reverses_entry_seq,
        recorded_by: entry.recorded_by,
        reason: entry.reason,
    })
}
