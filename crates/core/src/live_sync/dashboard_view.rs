use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sync_model::{DeltaPayload, SyncDelta};
use crate::ledger::{LedgerAggregate, LedgerEntry, LedgerSnapshot};
use crate::lifecycle::EventState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Already seen (`seq <= last_seq`) or for another event.
    Ignored,
    /// A seq was skipped; the view is unchanged and needs a snapshot.
    GapDetected,
}

/// Client-side dashboard state, rebuilt from a snapshot and advanced by deltas.
///
/// Aggregates are recomputed from the held entries, so a view that resynced
/// and one that saw every delta end up equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub event_id: String,
    pub event_state: EventState,
    pub goal: Decimal,
    pub entries: Vec<LedgerEntry>,
    pub aggregate: LedgerAggregate,
    pub last_seq: i64,
}

impl DashboardView {
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let mut entries = snapshot.entries;
        entries.sort_by_key(|e| e.seq);
        let goal = snapshot.aggregate.goal;
        let aggregate = LedgerAggregate::from_entries(&snapshot.event_id, goal, &entries);
        Self {
            last_seq: aggregate.last_seq,
            event_id: snapshot.event_id,
            event_state: snapshot.event_state,
            goal,
            entries,
            aggregate,
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: LedgerSnapshot) {
        *self = Self::from_snapshot(snapshot);
    }

    pub fn apply_delta(&mut self, delta: &SyncDelta) -> ApplyOutcome {
        if delta.event_id != self.event_id {
            return ApplyOutcome::Ignored;
        }
        match &delta.payload {
            DeltaPayload::Entry { entry, .. } => {
                if entry.seq <= self.last_seq {
                    return ApplyOutcome::Ignored;
                }
                if entry.seq > self.last_seq + 1 {
                    return ApplyOutcome::GapDetected;
                }
                self.entries.push(entry.clone());
                self.last_seq = entry.seq;
                self.aggregate =
                    LedgerAggregate::from_entries(&self.event_id, self.goal, &self.entries);
                ApplyOutcome::Applied
            }
            DeltaPayload::Stopped { .. } => {
                if self.event_state == EventState::Stopped {
                    return ApplyOutcome::Ignored;
                }
                self.event_state = EventState::Stopped;
                ApplyOutcome::Applied
            }
        }
    }
}
