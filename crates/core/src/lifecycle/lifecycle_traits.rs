//! Event repository and lifecycle service traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::lifecycle_model::{Event, FinalLedger, NewEvent, StoppedEvent};
use crate::errors::Result;

/// Persistence contract for events.
#[async_trait]
pub trait EventRepositoryTrait: Send + Sync {
    async fn create(&self, event: Event) -> Result<Event>;

    /// Atomically moves an event from Active to Stopped and returns the
    /// ledger as of that transition.
    ///
    /// Fails with `EventClosed` if it is already stopped. Serialized with
    /// every draft and ledger write for the same database.
    async fn mark_stopped(&self, event_id: &str, stopped_at: DateTime<Utc>) -> Result<FinalLedger>;

    async fn set_report_ref(&self, event_id: &str, report_ref: &str) -> Result<Event>;

    fn get_by_id(&self, event_id: &str) -> Result<Event>;

    /// All events, newest first.
    fn list(&self) -> Result<Vec<Event>>;
}

#[async_trait]
pub trait LifecycleServiceTrait: Send + Sync {
    async fn start_event(&self, new_event: NewEvent) -> Result<Event>;

    /// Stops intake, snapshots the ledger and hands it to the report exporter.
    async fn stop_event(&self, event_id: &str) -> Result<StoppedEvent>;

    fn get_event(&self, event_id: &str) -> Result<Event>;

    fn list_events(&self) -> Result<Vec<Event>>;
}
