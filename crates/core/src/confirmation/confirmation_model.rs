use serde::{Deserialize, Serialize};

use crate::ledger::{ConfirmedDonation, LedgerAggregate, LedgerEntry};

/// Human-edited fields for a draft, presented with the version the editor saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmDraftRequest {
    pub draft_id: String,
    pub expected_version: i64,
    pub donor_name: String,
    pub amount: String,
    pub editor_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationResult {
    pub donation: ConfirmedDonation,
    pub entry: LedgerEntry,
    pub aggregate: LedgerAggregate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseDonationRequest {
    pub event_id: String,
    pub donation_id: String,
    pub editor_id: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReversalResult {
    pub entry: LedgerEntry,
    pub aggregate: LedgerAggregate,
}
