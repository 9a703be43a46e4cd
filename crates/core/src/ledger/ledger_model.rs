//! Ledger domain models.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{CURRENCY_SCALE, PROGRESS_RATIO_SCALE};
use crate::lifecycle::EventState;

/// An immutable, human-confirmed donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedDonation {
    pub id: String,
    pub event_id: String,
    pub donor_name: String,
    pub amount: Decimal,
    pub confirmed_at: DateTime<Utc>,
    pub editor_id: String,
    pub origin_draft_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryKind {
    Donation,
    Reversal,
}

impl LedgerEntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryKind::Donation => "DONATION",
            LedgerEntryKind::Reversal => "REVERSAL",
        }
    }
}

impl std::str::FromStr for LedgerEntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DONATION" => Ok(LedgerEntryKind::Donation),
            "REVERSAL" => Ok(LedgerEntryKind::Reversal),
            other => Err(format!("unknown ledger entry kind: {other}")),
        }
    }
}

/// One sequenced ledger entry.
///
/// For a `Reversal`, `donation` is the donation being cancelled and
/// `reverses_entry_seq` points at its original entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub seq: i64,
    pub event_id: String,
    pub kind: LedgerEntryKind,
    pub donation: ConfirmedDonation,
    pub reverses_entry_seq: Option<i64>,
    pub recorded_by: String,
    pub reason: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Contribution of this entry to the event total.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            LedgerEntryKind::Donation => self.donation.amount,
            LedgerEntryKind::Reversal => -self.donation.amount,
        }
    }
}

/// Derived totals for one event. Always recomputed from the entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAggregate {
    pub event_id: String,
    pub goal: Decimal,
    pub total_raised: Decimal,
    pub donor_count: u64,
    pub progress_ratio: Decimal,
    /// `progress_ratio` as a percentage, capped at 100.
    pub progress_percent: Decimal,
    pub last_seq: i64,
}

impl LedgerAggregate {
    pub fn from_entries(event_id: &str, goal: Decimal, entries: &[LedgerEntry]) -> Self {
        let mut total_raised = Decimal::ZERO;
        let mut donor_count: i64 = 0;
        let mut last_seq = 0;

        for entry in entries {
            total_raised += entry.signed_amount();
            donor_count += match entry.kind {
                LedgerEntryKind::Donation => 1,
                LedgerEntryKind::Reversal => -1,
            };
            last_seq = last_seq.max(entry.seq);
        }
        total_raised.rescale(CURRENCY_SCALE);

        let progress_ratio = if goal > Decimal::ZERO {
            total_raised
                .checked_div(goal)
                .unwrap_or(Decimal::ZERO)
                .round_dp(PROGRESS_RATIO_SCALE)
        } else {
            Decimal::ZERO
        };
        let progress_percent = (progress_ratio * Decimal::ONE_HUNDRED)
            .min(Decimal::ONE_HUNDRED)
            .round_dp(CURRENCY_SCALE);

        Self {
            event_id: event_id.to_string(),
            goal,
            total_raised,
            donor_count: donor_count.max(0) as u64,
            progress_ratio,
            progress_percent,
            last_seq,
        }
    }
}

/// An appended entry with the event totals as of its commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedEntry {
    pub entry: LedgerEntry,
    pub aggregate: LedgerAggregate,
}

/// Point-in-time view of an event's ledger, used for resync and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub event_id: String,
    pub event_state: EventState,
    pub entries: Vec<LedgerEntry>,
    pub aggregate: LedgerAggregate,
}

/// Donations that have not been reversed, in seq order.
pub fn live_donations(entries: &[LedgerEntry]) -> Vec<&ConfirmedDonation> {
    let reversed: HashSet<&str> = entries
        .iter()
        .filter(|e| e.kind == LedgerEntryKind::Reversal)
        .map(|e| e.donation.id.as_str())
        .collect();

    let mut donations: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|e| e.kind == LedgerEntryKind::Donation && !reversed.contains(e.donation.id.as_str()))
        .collect();
    donations.sort_by_key(|e| e.seq);
    donations.into_iter().map(|e| &e.donation).collect()
}

/// Input for the atomic confirm-and-append job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConfirmation {
    pub draft_id: String,
    pub expected_version: i64,
    pub donation_id: String,
    pub donor_name: String,
    pub amount: Decimal,
    pub editor_id: String,
    pub confirmed_at: DateTime<Utc>,
}

/// Input for appending a compensating entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReversal {
    pub event_id: String,
    pub donation_id: String,
    pub editor_id: String,
    pub reason: Option<String>,
    pub recorded_at: DateTime<Utc>,
}
