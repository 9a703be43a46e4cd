//! Donation draft domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::extraction::{ExtractionFailureKind, FieldConfidence};
use crate::lifecycle::Event;
use crate::validation::{FieldFlags, ValidationIssue};

/// Draft status. `Confirmed` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftStatus {
    Extracted,
    NeedsManualEntry,
    UnderReview,
    Confirmed,
    Rejected,
}

impl DraftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::Extracted => "EXTRACTED",
            DraftStatus::NeedsManualEntry => "NEEDS_MANUAL_ENTRY",
            DraftStatus::UnderReview => "UNDER_REVIEW",
            DraftStatus::Confirmed => "CONFIRMED",
            DraftStatus::Rejected => "REJECTED",
        }
    }

    /// Statuses held by the review queue.
    pub fn is_reviewable(&self) -> bool {
        matches!(
            self,
            DraftStatus::Extracted | DraftStatus::NeedsManualEntry | DraftStatus::UnderReview
        )
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_reviewable()
    }
}

impl std::str::FromStr for DraftStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "EXTRACTED" => Ok(DraftStatus::Extracted),
            "NEEDS_MANUAL_ENTRY" => Ok(DraftStatus::NeedsManualEntry),
            "UNDER_REVIEW" => Ok(DraftStatus::UnderReview),
            "CONFIRMED" => Ok(DraftStatus::Confirmed),
            "REJECTED" => Ok(DraftStatus::Rejected),
            other => Err(format!("unknown draft status: {other}")),
        }
    }
}

/// A machine-read (or blank) form awaiting human confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationDraft {
    pub id: String,
    pub event_id: String,
    pub source_image_ref: String,
    pub raw_name: String,
    pub raw_amount: String,
    pub confidence: FieldConfidence,
    pub status: DraftStatus,
    pub version: i64,
    pub suggested_name: Option<String>,
    pub suggested_amount: Option<Decimal>,
    pub flags: FieldFlags,
    pub issues: Vec<ValidationIssue>,
    pub extraction_error: Option<ExtractionFailureKind>,
    pub reviewer_id: Option<String>,
    pub confirmed_donation_id: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DonationDraft {
    /// Fails with `ConfirmationConflict` on a stale version or a terminal draft.
    pub fn ensure_actionable(&self, expected_version: i64) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::ConfirmationConflict(format!(
                "draft {} is already {}",
                self.id,
                self.status.as_str()
            )));
        }
        if self.version != expected_version {
            return Err(Error::ConfirmationConflict(format!(
                "draft {} is at version {}, not {}",
                self.id, self.version, expected_version
            )));
        }
        Ok(())
    }

    /// Marks the draft confirmed as `donation_id`.
    pub fn confirmed_as(
        mut self,
        donation_id: &str,
        editor_id: &str,
        at: DateTime<Utc>,
    ) -> Self {
        self.status = DraftStatus::Confirmed;
        self.confirmed_donation_id = Some(donation_id.to_string());
        self.reviewer_id = Some(editor_id.to_string());
        self.version += 1;
        self.updated_at = at;
        self
    }
}

/// A version-checked change made by a reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftTransition {
    Open { editor_id: String },
    Reject {
        editor_id: String,
        reason: Option<String>,
    },
}

impl DraftTransition {
    /// Applies the transition, checking version, status and event state.
    ///
    /// Storage runs this inside its write transaction so the checks and the
    /// write are one unit.
    pub fn apply(
        &self,
        draft: &DonationDraft,
        expected_version: i64,
        event: &Event,
        at: DateTime<Utc>,
    ) -> Result<DonationDraft> {
        draft.ensure_actionable(expected_version)?;
        event.ensure_active()?;

        let mut next = draft.clone();
        match self {
            DraftTransition::Open { editor_id } => {
                next.status = DraftStatus::UnderReview;
                next.reviewer_id = Some(editor_id.clone());
            }
            DraftTransition::Reject { editor_id, reason } => {
                next.status = DraftStatus::Rejected;
                next.reviewer_id = Some(editor_id.clone());
                next.rejection_reason = reason.clone();
            }
        }
        next.version += 1;
        next.updated_at = at;
        Ok(next)
    }
}

/// Result of opening a draft for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedDraft {
    pub draft: DonationDraft,
    /// Draft previously held open by the same editor, now released.
    pub released_draft_id: Option<String>,
}
