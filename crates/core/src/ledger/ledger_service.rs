use std::sync::Arc;

use super::ledger_model::{live_donations, LedgerAggregate, LedgerEntry, LedgerSnapshot};
use super::ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
use crate::errors::Result;
use crate::export::ReportRow;
use crate::lifecycle::EventRepositoryTrait;

/// Read side of the ledger: aggregates, snapshots and export rows.
pub struct LedgerService {
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    event_repository: Arc<dyn EventRepositoryTrait>,
}

impl LedgerService {
    pub fn new(
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        event_repository: Arc<dyn EventRepositoryTrait>,
    ) -> Self {
        Self {
            ledger_repository,
            event_repository,
        }
    }
}

impl LedgerServiceTrait for LedgerService {
    fn aggregate(&self, event_id: &str) -> Result<LedgerAggregate> {
        let event = self.event_repository.get_by_id(event_id)?;
        let entries = self.ledger_repository.list_entries(event_id)?;
        Ok(LedgerAggregate::from_entries(
            event_id,
            event.goal_amount,
            &entries,
        ))
    }

    fn snapshot(&self, event_id: &str) -> Result<LedgerSnapshot> {
        let event = self.event_repository.get_by_id(event_id)?;
        let entries = self.ledger_repository.list_entries(event_id)?;
        let aggregate = LedgerAggregate::from_entries(event_id, event.goal_amount, &entries);
        Ok(LedgerSnapshot {
            event_id: event.id,
            event_state: event.state,
            entries,
            aggregate,
        })
    }

    fn entries_since(&self, event_id: &str, after_seq: i64) -> Result<Vec<LedgerEntry>> {
        // Surface NotFound for unknown events instead of an empty list.
        self.event_repository.get_by_id(event_id)?;
        self.ledger_repository.entries_since(event_id, after_seq)
    }

    fn export_rows(&self, event_id: &str) -> Result<Vec<ReportRow>> {
        self.event_repository.get_by_id(event_id)?;
        let entries = self.ledger_repository.list_entries(event_id)?;
        Ok(live_donations(&entries)
            .into_iter()
            .map(ReportRow::from)
            .collect())
    }
}
