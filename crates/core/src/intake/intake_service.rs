use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::drafts::{DonationDraft, DraftRepositoryTrait, DraftStatus};
use crate::errors::{Error, Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};
use crate::extraction::{
    ExtractedFields, ExtractionFailureKind, ExtractionOutcome, FieldConfidence, FormExtractor,
};
use crate::lifecycle::EventRepositoryTrait;
use crate::settings::IntakeSettings;
use crate::validation::{FieldFlags, FieldValidator};

#[async_trait::async_trait]
pub trait IntakeServiceTrait: Send + Sync {
    /// Runs extraction and validation for one form image and stores the
    /// resulting draft. Extraction problems never fail the submission.
    async fn submit_draft(&self, event_id: &str, image_ref: &str) -> Result<DonationDraft>;
}

/// Entry point of the pipeline: image in, draft out.
pub struct IntakeService {
    event_repository: Arc<dyn EventRepositoryTrait>,
    draft_repository: Arc<dyn DraftRepositoryTrait>,
    extractor: Arc<dyn FormExtractor>,
    validator: FieldValidator,
    extraction_timeout: Duration,
    event_sink: Arc<dyn DomainEventSink>,
}

impl IntakeService {
    pub fn new(
        event_repository: Arc<dyn EventRepositoryTrait>,
        draft_repository: Arc<dyn DraftRepositoryTrait>,
        extractor: Arc<dyn FormExtractor>,
        settings: &IntakeSettings,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            event_repository,
            draft_repository,
            extractor,
            validator: FieldValidator::new(settings.confidence_threshold),
            extraction_timeout: settings.extraction_timeout,
            event_sink,
        }
    }

    async fn extract_bounded(&self, image_ref: &str) -> ExtractionOutcome {
        match tokio::time::timeout(self.extraction_timeout, self.extractor.extract(image_ref)).await
        {
            Ok(outcome) => outcome,
            Err(_) => ExtractionOutcome::failure(
                ExtractionFailureKind::Timeout,
                format!("no answer within {:?}", self.extraction_timeout),
            ),
        }
    }

    fn build_draft(
        &self,
        event_id: &str,
        image_ref: &str,
        outcome: ExtractionOutcome,
    ) -> DonationDraft {
        let now = Utc::now();
        let mut draft = DonationDraft {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            source_image_ref: image_ref.to_string(),
            raw_name: String::new(),
            raw_amount: String::new(),
            confidence: FieldConfidence::default(),
            status: DraftStatus::NeedsManualEntry,
            version: 1,
            suggested_name: None,
            suggested_amount: None,
            flags: FieldFlags::default(),
            issues: Vec::new(),
            extraction_error: None,
            reviewer_id: None,
            confirmed_donation_id: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };

        match outcome {
            ExtractionOutcome::Success { fields, confidence } => {
                let report = self.validator.assess(&fields, Some(confidence));
                draft.issues = report.issues();
                draft.flags = report.flags;
                draft.suggested_name = report.donor_name;
                draft.suggested_amount = report.amount;
                draft.confidence = confidence;
                draft.status = DraftStatus::Extracted;
                let ExtractedFields {
                    raw_name,
                    raw_amount,
                } = fields;
                draft.raw_name = raw_name;
                draft.raw_amount = raw_amount;
            }
            ExtractionOutcome::Failure(failure) => {
                warn!(
                    "Extraction failed for image {} ({}); draft needs manual entry",
                    image_ref, failure
                );
                draft.extraction_error = Some(failure.kind);
            }
        }
        draft
    }
}

#[async_trait::async_trait]
impl IntakeServiceTrait for IntakeService {
    async fn submit_draft(&self, event_id: &str, image_ref: &str) -> Result<DonationDraft> {
        let image_ref = image_ref.trim();
        if image_ref.is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "imageRef".to_string(),
            )));
        }

        self.event_repository.get_by_id(event_id)?.ensure_active()?;

        let outcome = self.extract_bounded(image_ref).await;
        let draft = self.build_draft(event_id, image_ref, outcome);

        // The repository re-checks the event inside the write, so a stop that
        // landed during extraction turns into EventClosed here.
        let stored = self.draft_repository.create(draft).await?;
        info!(
            "Draft {} submitted for event {} as {}",
            stored.id,
            event_id,
            stored.status.as_str()
        );
        self.event_sink.emit(DomainEvent::draft_submitted(
            event_id,
            stored.id.clone(),
            stored.status,
        ));
        Ok(stored)
    }
}
