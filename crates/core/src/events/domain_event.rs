//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::drafts::DraftStatus;
use crate::ledger::{LedgerAggregate, LedgerEntry};
use crate::lifecycle::Event;

/// Domain events emitted by core services after successful mutations.
///
/// These events represent committed facts. Runtime adapters translate them
/// into dashboard deltas, logs or notifications.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A new event started accepting intake.
    EventStarted { event: Event },

    /// A form was submitted and its draft stored.
    DraftSubmitted {
        event_id: String,
        draft_id: String,
        status: DraftStatus,
    },

    /// A draft was confirmed and its donation appended to the ledger.
    DonationConfirmed {
        entry: LedgerEntry,
        aggregate: LedgerAggregate,
    },

    /// A compensating reversal was appended to the ledger.
    DonationReversed {
        entry: LedgerEntry,
        aggregate: LedgerAggregate,
    },

    /// The event stopped. `last_seq` is the final ledger seq.
    EventStopped {
        event: Event,
        aggregate: LedgerAggregate,
        last_seq: i64,
    },
}

impl DomainEvent {
    pub fn event_started(event: Event) -> Self {
        Self::EventStarted { event }
    }

    pub fn draft_submitted(
        event_id: impl Into<String>,
        draft_id: impl Into<String>,
        status: DraftStatus,
    ) -> Self {
        Self::DraftSubmitted {
            event_id: event_id.into(),
            draft_id: draft_id.into(),
            status,
        }
    }

    pub fn donation_confirmed(entry: LedgerEntry, aggregate: LedgerAggregate) -> Self {
        Self::DonationConfirmed { entry, aggregate }
    }

    pub fn donation_reversed(entry: LedgerEntry, aggregate: LedgerAggregate) -> Self {
        Self::DonationReversed { entry, aggregate }
    }

    pub fn event_stopped(event: Event, aggregate: LedgerAggregate) -> Self {
        let last_seq = aggregate.last_seq;
        Self::EventStopped {
            event,
            aggregate,
            last_seq,
        }
    }

    /// The fundraising event this domain event belongs to.
    pub fn event_id(&self) -> &str {
        match self {
            Self::EventStarted { event } | Self::EventStopped { event, .. } => &event.id,
            Self::DraftSubmitted { event_id, .. } => event_id,
            Self::DonationConfirmed { entry, .. } | Self::DonationReversed { entry, .. } => {
                &entry.event_id
            }
        }
    }
}
