//! Wire types pushed to dashboard subscribers.

use serde::{Deserialize, Serialize};

use crate::events::DomainEvent;
use crate::ledger::{LedgerAggregate, LedgerEntry};
use crate::lifecycle::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncDeltaType {
    DonationConfirmed,
    DonationReversed,
    EventStopped,
}

impl SyncDeltaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncDeltaType::DonationConfirmed => "DonationConfirmed",
            SyncDeltaType::DonationReversed => "DonationReversed",
            SyncDeltaType::EventStopped => "EventStopped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeltaPayload {
    Entry {
        entry: LedgerEntry,
        aggregate: LedgerAggregate,
    },
    Stopped {
        event: Event,
        aggregate: LedgerAggregate,
    },
}

/// One ledger or lifecycle change, `{type, seq?, payload}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDelta {
    #[serde(rename = "type")]
    pub kind: SyncDeltaType,
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<i64>,
    pub payload: DeltaPayload,
}

impl SyncDelta {
    /// Dashboard delta for a domain event, if the dashboard cares about it.
    ///
    /// Returns the delta plus the seq it must follow: its own seq for ledger
    /// entries, the final ledger seq for `EventStopped`.
    pub fn from_domain_event(event: &DomainEvent) -> Option<(SyncDelta, i64)> {
        match event {
            DomainEvent::DonationConfirmed { entry, aggregate } => Some((
                SyncDelta {
                    kind: SyncDeltaType::DonationConfirmed,
                    event_id: entry.event_id.clone(),
                    seq: Some(entry.seq),
                    payload: DeltaPayload::Entry {
                        entry: entry.clone(),
                        aggregate: aggregate.clone(),
                    },
                },
                entry.seq,
            )),
            DomainEvent::DonationReversed { entry, aggregate } => Some((
                SyncDelta {
                    kind: SyncDeltaType::DonationReversed,
                    event_id: entry.event_id.clone(),
                    seq: Some(entry.seq),
                    payload: DeltaPayload::Entry {
                        entry: entry.clone(),
                        aggregate: aggregate.clone(),
                    },
                },
                entry.seq,
            )),
            DomainEvent::EventStopped {
                event,
                aggregate,
                last_seq,
            } => Some((
                SyncDelta {
                    kind: SyncDeltaType::EventStopped,
                    event_id: event.id.clone(),
                    seq: None,
                    payload: DeltaPayload::Stopped {
                        event: event.clone(),
                        aggregate: aggregate.clone(),
                    },
                },
                *last_seq,
            )),
            DomainEvent::EventStarted { .. } | DomainEvent::DraftSubmitted { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == SyncDeltaType::EventStopped
    }
}

/// What a subscriber receives next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncMessage {
    Delta(SyncDelta),
    /// Deltas were dropped. Fetch a snapshot and continue from its seq.
    ResyncRequired { event_id: String },
}
