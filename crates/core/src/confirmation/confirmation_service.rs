use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;
use uuid::Uuid;

use super::confirmation_model::{
    ConfirmDraftRequest, ConfirmationResult, ReversalResult, ReverseDonationRequest,
};
use crate::drafts::{DraftRepositoryTrait, EditorSessions};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::ledger::{
    CommittedEntry, LedgerRepositoryTrait, NewConfirmation, NewReversal, RetryPolicy,
};
use crate::lifecycle::EventRepositoryTrait;
use crate::settings::IntakeSettings;
use crate::validation::{require_editor_id, FieldValidator};

#[async_trait::async_trait]
pub trait ConfirmationServiceTrait: Send + Sync {
    /// Validates the edited fields and commits exactly one donation per draft.
    async fn confirm_draft(&self, request: ConfirmDraftRequest) -> Result<ConfirmationResult>;

    /// Appends a compensating entry that cancels a confirmed donation.
    async fn reverse_donation(&self, request: ReverseDonationRequest) -> Result<ReversalResult>;
}

/// The only writer of ledger entries.
pub struct ConfirmationService {
    draft_repository: Arc<dyn DraftRepositoryTrait>,
    event_repository: Arc<dyn EventRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    validator: FieldValidator,
    retry_policy: RetryPolicy,
    sessions: Arc<EditorSessions>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl ConfirmationService {
    pub fn new(
        draft_repository: Arc<dyn DraftRepositoryTrait>,
        event_repository: Arc<dyn EventRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        settings: &IntakeSettings,
        sessions: Arc<EditorSessions>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            draft_repository,
            event_repository,
            ledger_repository,
            validator: FieldValidator::new(settings.confidence_threshold),
            retry_policy: settings.ledger_retry,
            sessions,
            event_sink,
        }
    }
}

#[async_trait::async_trait]
impl ConfirmationServiceTrait for ConfirmationService {
    async fn confirm_draft(&self, request: ConfirmDraftRequest) -> Result<ConfirmationResult> {
        let editor_id = require_editor_id(&request.editor_id)?;

        let draft = self.draft_repository.get_by_id(&request.draft_id)?;
        draft.ensure_actionable(request.expected_version)?;

        let fields = self
            .validator
            .validate(&request.donor_name, &request.amount)?;

        self.event_repository
            .get_by_id(&draft.event_id)?
            .ensure_active()?;

        let confirmation = NewConfirmation {
            draft_id: draft.id.clone(),
            expected_version: request.expected_version,
            donation_id: Uuid::new_v4().to_string(),
            donor_name: fields.donor_name,
            amount: fields.amount,
            editor_id,
            confirmed_at: Utc::now(),
        };

        let CommittedEntry { entry, aggregate } = self
            .retry_policy
            .run("ledger append", || {
                self.ledger_repository
                    .append_confirmation(confirmation.clone())
            })
            .await?;

        // Committed: nothing below may fail or suspend before the emit.
        self.event_sink.emit(DomainEvent::donation_confirmed(
            entry.clone(),
            aggregate.clone(),
        ));
        self.sessions.release_draft(&draft.id);

        info!(
            "Draft {} confirmed as donation {} (seq {}) for event {}",
            draft.id, entry.donation.id, entry.seq, entry.event_id
        );
        debug!(
            "Event {} total now {} across {} donor(s)",
            aggregate.event_id, aggregate.total_raised, aggregate.donor_count
        );

        Ok(ConfirmationResult {
            donation: entry.donation.clone(),
            entry,
            aggregate,
        })
    }

    async fn reverse_donation(&self, request: ReverseDonationRequest) -> Result<ReversalResult> {
        let editor_id = require_editor_id(&request.editor_id)?;

        let donation = self.ledger_repository.get_donation(&request.donation_id)?;
        if donation.event_id != request.event_id {
            return Err(Error::not_found(format!(
                "donation {} in event {}",
                request.donation_id, request.event_id
            )));
        }
        self.event_repository
            .get_by_id(&request.event_id)?
            .ensure_active()?;

        let reversal = NewReversal {
            event_id: request.event_id.clone(),
            donation_id: donation.id.clone(),
            editor_id,
            reason: request
                .reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            recorded_at: Utc::now(),
        };

        let CommittedEntry { entry, aggregate } = self
            .retry_policy
            .run("ledger reversal", || {
                self.ledger_repository.append_reversal(reversal.clone())
            })
            .await?;

        self.event_sink.emit(DomainEvent::donation_reversed(
            entry.clone(),
            aggregate.clone(),
        ));
        info!(
            "Donation {} reversed (seq {}) for event {}",
            donation.id, entry.seq, entry.event_id
        );

        Ok(ReversalResult { entry, aggregate })
    }
}
