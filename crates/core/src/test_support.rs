//! In-memory repositories and stubs shared by service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::drafts::{DonationDraft, DraftRepositoryTrait, DraftTransition};
use crate::errors::{DatabaseError, Error, Result};
use crate::extraction::{
    ExtractedFields, ExtractionFailureKind, ExtractionOutcome, FieldConfidence, FormExtractor,
};
use crate::ledger::{
    CommittedEntry, ConfirmedDonation, LedgerAggregate, LedgerEntry, LedgerEntryKind,
    LedgerRepositoryTrait, NewConfirmation, NewReversal,
};
use crate::lifecycle::{Event, EventRepositoryTrait, FinalLedger};

#[derive(Default)]
struct State {
    events: Vec<Event>,
    drafts: HashMap<String, DonationDraft>,
    entries: Vec<LedgerEntry>,
}

/// One mutex over everything, standing in for the single writer.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    failing_appends: AtomicU32,
    failing_reads: AtomicU32,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes the next `n` ledger appends fail with a transient error.
    pub fn fail_next_appends(&self, n: u32) {
        self.failing_appends.store(n, Ordering::SeqCst);
    }

    /// Makes the next `n` ledger reads fail, as a lost pool connection would.
    pub fn fail_next_reads(&self, n: u32) {
        self.failing_reads.store(n, Ordering::SeqCst);
    }

    pub fn entry_count(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    fn take_injected_failure(&self) -> Result<()> {
        let remaining = self.failing_appends.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_appends.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::Database(DatabaseError::QueryFailed(
                "database is locked".to_string(),
            )));
        }
        Ok(())
    }

    fn take_injected_read_failure(&self) -> Result<()> {
        let remaining = self.failing_reads.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_reads.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::Database(DatabaseError::ConnectionFailed(
                "timed out waiting for connection".to_string(),
            )));
        }
        Ok(())
    }
}

fn event_entries(state: &State, event_id: &str) -> Vec<LedgerEntry> {
    let mut entries: Vec<LedgerEntry> = state
        .entries
        .iter()
        .filter(|e| e.event_id == event_id)
        .cloned()
        .collect();
    entries.sort_by_key(|e| e.seq);
    entries
}

fn commit(state: &mut State, entry: LedgerEntry) -> Result<CommittedEntry> {
    let goal = find_event(state, &entry.event_id)?.goal_amount;
    state.entries.push(entry.clone());
    let entries = event_entries(state, &entry.event_id);
    let aggregate = LedgerAggregate::from_entries(&entry.event_id, goal, &entries);
    Ok(CommittedEntry { entry, aggregate })
}

fn find_event<'a>(state: &'a State, event_id: &str) -> Result<&'a Event> {
    state
        .events
        .iter()
        .find(|e| e.id == event_id)
        .ok_or_else(|| Error::not_found(format!("event {event_id}")))
}

fn next_seq(state: &State, event_id: &str) -> i64 {
    state
        .entries
        .iter()
        .filter(|e| e.event_id == event_id)
        .map(|e| e.seq)
        .max()
        .unwrap_or(0)
        + 1
}

#[async_trait]
impl EventRepositoryTrait for InMemoryStore {
    async fn create(&self, event: Event) -> Result<Event> {
        self.state.lock().unwrap().events.push(event.clone());
        Ok(event)
    }

    async fn mark_stopped(
        &self,
        event_id: &str,
        stopped_at: DateTime<Utc>,
    ) -> Result<FinalLedger> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| Error::not_found(format!("event {event_id}")))?;
        let stopped = slot.clone().stopped(stopped_at)?;
        *slot = stopped.clone();
        Ok(FinalLedger {
            event: stopped,
            entries: event_entries(&state, event_id),
        })
    }

    async fn set_report_ref(&self, event_id: &str, report_ref: &str) -> Result<Event> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| Error::not_found(format!("event {event_id}")))?;
        slot.report_ref = Some(report_ref.to_string());
        Ok(slot.clone())
    }

    fn get_by_id(&self, event_id: &str) -> Result<Event> {
        find_event(&self.state.lock().unwrap(), event_id).cloned()
    }

    fn list(&self) -> Result<Vec<Event>> {
        let mut events = self.state.lock().unwrap().events.clone();
        events.reverse();
        Ok(events)
    }
}

#[async_trait]
impl DraftRepositoryTrait for InMemoryStore {
    async fn create(&self, draft: DonationDraft) -> Result<DonationDraft> {
        let mut state = self.state.lock().unwrap();
        find_event(&state, &draft.event_id)?.ensure_active()?;
        state.drafts.insert(draft.id.clone(), draft.clone());
        Ok(draft)
    }

    async fn transition(
        &self,
        draft_id: &str,
        expected_version: i64,
        transition: DraftTransition,
    ) -> Result<DonationDraft> {
        let mut state = self.state.lock().unwrap();
        let draft = state
            .drafts
            .get(draft_id)
            .ok_or_else(|| Error::not_found(format!("draft {draft_id}")))?;
        let event = find_event(&state, &draft.event_id)?;
        let updated = transition.apply(draft, expected_version, event, Utc::now())?;
        state.drafts.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    fn get_by_id(&self, draft_id: &str) -> Result<DonationDraft> {
        self.state
            .lock()
            .unwrap()
            .drafts
            .get(draft_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("draft {draft_id}")))
    }

    fn list_reviewable(&self, event_id: &str) -> Result<Vec<DonationDraft>> {
        let mut drafts: Vec<DonationDraft> = self
            .state
            .lock()
            .unwrap()
            .drafts
            .values()
            .filter(|d| d.event_id == event_id && d.status.is_reviewable())
            .cloned()
            .collect();
        drafts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(drafts)
    }
}

#[async_trait]
impl LedgerRepositoryTrait for InMemoryStore {
    async fn append_confirmation(&self, confirmation: NewConfirmation) -> Result<CommittedEntry> {
        self.take_injected_failure()?;
        let mut state = self.state.lock().unwrap();
        let draft = state
            .drafts
            .get(&confirmation.draft_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("draft {}", confirmation.draft_id)))?;
        draft.ensure_actionable(confirmation.expected_version)?;
        find_event(&state, &draft.event_id)?.ensure_active()?;

        let seq = next_seq(&state, &draft.event_id);
        let entry = LedgerEntry {
            seq,
            event_id: draft.event_id.clone(),
            kind: LedgerEntryKind::Donation,
            donation: ConfirmedDonation {
                id: confirmation.donation_id.clone(),
                event_id: draft.event_id.clone(),
                donor_name: confirmation.donor_name.clone(),
                amount: confirmation.amount,
                confirmed_at: confirmation.confirmed_at,
                editor_id: confirmation.editor_id.clone(),
                origin_draft_id: draft.id.clone(),
            },
            reverses_entry_seq: None,
            recorded_by: confirmation.editor_id.clone(),
            reason: None,
            recorded_at: confirmation.confirmed_at,
        };
        let confirmed = draft.confirmed_as(
            &confirmation.donation_id,
            &confirmation.editor_id,
            confirmation.confirmed_at,
        );
        state.drafts.insert(confirmed.id.clone(), confirmed);
        commit(&mut state, entry)
    }

    async fn append_reversal(&self, reversal: NewReversal) -> Result<CommittedEntry> {
        self.take_injected_failure()?;
        let mut state = self.state.lock().unwrap();
        find_event(&state, &reversal.event_id)?.ensure_active()?;
        let original = state
            .entries
            .iter()
            .find(|e| e.kind == LedgerEntryKind::Donation && e.donation.id == reversal.donation_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("donation {}", reversal.donation_id)))?;
        if state
            .entries
            .iter()
            .any(|e| e.kind == LedgerEntryKind::Reversal && e.donation.id == reversal.donation_id)
        {
            return Err(Error::ConfirmationConflict(format!(
                "donation {} is already reversed",
                reversal.donation_id
            )));
        }

        let entry = LedgerEntry {
            seq: next_seq(&state, &reversal.event_id),
            kind: LedgerEntryKind::Reversal,
            reverses_entry_seq: Some(original.seq),
            recorded_by: reversal.editor_id,
            reason: reversal.reason,
            recorded_at: reversal.recorded_at,
            ..original
        };
        commit(&mut state, entry)
    }

    fn list_entries(&self, event_id: &str) -> Result<Vec<LedgerEntry>> {
        self.entries_since(event_id, 0)
    }

    fn entries_since(&self, event_id: &str, after_seq: i64) -> Result<Vec<LedgerEntry>> {
        self.take_injected_read_failure()?;
        let mut entries = event_entries(&self.state.lock().unwrap(), event_id);
        entries.retain(|e| e.seq > after_seq);
        Ok(entries)
    }

    fn get_donation(&self, donation_id: &str) -> Result<ConfirmedDonation> {
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .find(|e| e.kind == LedgerEntryKind::Donation && e.donation.id == donation_id)
            .map(|e| e.donation.clone())
            .ok_or_else(|| Error::not_found(format!("donation {donation_id}")))
    }
}

/// Extractor returning canned outcomes keyed by image ref.
#[derive(Default)]
pub struct StubExtractor {
    outcomes: Mutex<HashMap<String, ExtractionOutcome>>,
    delay: Option<Duration>,
}

impl StubExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never answers before `delay` elapses.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn with_fields(self, image_ref: &str, name: &str, amount: &str, confidence: f64) -> Self {
        self.outcomes.lock().unwrap().insert(
            image_ref.to_string(),
            ExtractionOutcome::success(
                ExtractedFields::new(name, amount),
                FieldConfidence::new(confidence, confidence),
            ),
        );
        self
    }
}

#[async_trait]
impl FormExtractor for StubExtractor {
    async fn extract(&self, image_ref: &str) -> ExtractionOutcome {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcomes
            .lock()
            .unwrap()
            .get(image_ref)
            .cloned()
            .unwrap_or_else(|| {
                ExtractionOutcome::failure(ExtractionFailureKind::ImageUnreadable, "no stub")
            })
    }
}
