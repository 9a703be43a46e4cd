//! Database models for donation drafts.

use diesel::prelude::*;

use pledgeboard_core::drafts::{DonationDraft, DraftStatus};
use pledgeboard_core::extraction::{ExtractionFailureKind, FieldConfidence};
use pledgeboard_core::validation::{FieldFlags, ValidationIssue};

use crate::errors::StorageError;
use crate::utils::{format_timestamp, parse_decimal, parse_enum, parse_timestamp};

/// Database model for drafts. Flags and issues are small JSON blobs; they
/// are only ever read back whole.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::donation_drafts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct DonationDraftDB {
    pub id: String,
    pub event_id: String,
    pub source_image_ref: String,
    pub raw_name: String,
    pub raw_amount: String,
    pub name_confidence: f64,
    pub amount_confidence: f64,
    pub status: String,
    pub version: i64,
    pub suggested_name: Option<String>,
    pub suggested_amount: Option<String>,
    pub flags_json: String,
    pub issues_json: String,
    pub extraction_error: Option<String>,
    pub reviewer_id: Option<String>,
    pub confirmed_donation_id: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<DonationDraftDB> for DonationDraft {
    type Error = StorageError;

    fn try_from(db: DonationDraftDB) -> Result<Self, Self::Error> {
        let flags: FieldFlags = serde_json::from_str(&db.flags_json)
            .map_err(|e| StorageError::corrupt("donation_drafts.flags_json", e))?;
        let issues: Vec<ValidationIssue> = serde_json::from_str(&db.issues_json)
            .map_err(|e| StorageError::corrupt("donation_drafts.issues_json", e))?;

        Ok(Self {
            confidence: FieldConfidence::new(db.name_confidence, db.amount_confidence),
            status: parse_enum::<DraftStatus>("donation_drafts.status", &db.status)?,
            suggested_amount: db
                .suggested_amount
                .as_deref()
                .map(|raw| parse_decimal("donation_drafts.suggested_amount", raw))
                .transpose()?,
            extraction_error: db
                .extraction_error
                .as_deref()
                .map(|raw| {
                    parse_enum::<ExtractionFailureKind>("donation_drafts.extraction_error", raw)
                })
                .transpose()?,
            created_at: parse_timestamp("donation_drafts.created_at", &db.created_at)?,
            updated_at: parse_timestamp("donation_drafts.updated_at", &db.updated_at)?,
            flags,
            issues,
            id: db.id,
            event_id: db.event_id,
            source_image_ref: db.source_image_ref,
            raw_name: db.raw_name,
            raw_amount: db.raw_amount,
            version: db.version,
            suggested_name: db.suggested_name,
            reviewer_id: db.reviewer_id,
            confirmed_donation_id: db.confirmed_donation_id,
            rejection_reason: db.rejection_reason,
        })
    }
}

impl TryFrom<&DonationDraft> for DonationDraftDB {
    type Error = StorageError;

    fn try_from(domain: &DonationDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            id: domain.id.clone(),
            event_id: domain.event_id.clone(),
            source_image_ref: domain.source_image_ref.clone(),
            raw_name: domain.raw_name.clone(),
            raw_amount: domain.raw_amount.clone(),
            name_confidence: domain.confidence.name,
            amount_confidence: domain.confidence.amount,
            status: domain.status.as_str().to_string(),
            version: domain.version,
            suggested_name: domain.suggested_name.clone(),
            suggested_amount: domain.suggested_amount.map(|a| a.to_string()),
            flags_json: serde_json::to_string(&domain.flags)?,
            issues_json: serde_json::to_string(&domain.issues)?,
            extraction_error: domain.extraction_error.map(|k| k.as_str().to_string()),
            reviewer_id: domain.reviewer_id.clone(),
            confirmed_donation_id: domain.confirmed_donation_id.clone(),
            rejection_reason: domain.rejection_reason.clone(),
            created_at: format_timestamp(domain.created_at),
            updated_at: format_timestamp(domain.updated_at),
        })
    }
}
