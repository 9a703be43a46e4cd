use chrono::Utc;
use log::{error, info};
use std::sync::Arc;
use uuid::Uuid;

use super::lifecycle_model::{Event, EventState, FinalLedger, NewEvent, StoppedEvent};
use super::lifecycle_traits::{EventRepositoryTrait, LifecycleServiceTrait};
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink};
use crate::export::{ReportExporter, ReportRow};
use crate::ledger::{live_donations, LedgerAggregate};

/// Owns event state: the only writer of `Active -> Stopped`.
pub struct LifecycleService {
    event_repository: Arc<dyn EventRepositoryTrait>,
    exporter: Arc<dyn ReportExporter>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl LifecycleService {
    pub fn new(
        event_repository: Arc<dyn EventRepositoryTrait>,
        exporter: Arc<dyn ReportExporter>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            event_repository,
            exporter,
            event_sink,
        }
    }
}

#[async_trait::async_trait]
impl LifecycleServiceTrait for LifecycleService {
    async fn start_event(&self, new_event: NewEvent) -> Result<Event> {
        let goal_amount = new_event.parse_goal()?;
        let event = Event {
            id: Uuid::new_v4().to_string(),
            name: new_event.display_name(),
            goal_amount,
            state: EventState::Active,
            started_at: Utc::now(),
            stopped_at: None,
            report_ref: None,
        };

        let created = self.event_repository.create(event).await?;
        info!(
            "Started event {} with goal {}",
            created.id, created.goal_amount
        );
        self.event_sink
            .emit(DomainEvent::event_started(created.clone()));
        Ok(created)
    }

    async fn stop_event(&self, event_id: &str) -> Result<StoppedEvent> {
        // The ledger is read by the stopping transaction itself.
        let FinalLedger { event, entries } = self
            .event_repository
            .mark_stopped(event_id, Utc::now())
            .await?;

        let aggregate = LedgerAggregate::from_entries(event_id, event.goal_amount, &entries);
        self.event_sink
            .emit(DomainEvent::event_stopped(event.clone(), aggregate.clone()));
        info!(
            "Stopped event {}: {} donation(s), total {}",
            event_id, aggregate.donor_count, aggregate.total_raised
        );

        let rows: Vec<ReportRow> = live_donations(&entries)
            .into_iter()
            .map(ReportRow::from)
            .collect();

        let mut event = event;
        let report_ref = match self.exporter.export(&event, &rows) {
            Ok(report_ref) => {
                match self
                    .event_repository
                    .set_report_ref(event_id, &report_ref)
                    .await
                {
                    Ok(updated) => event = updated,
                    Err(e) => error!("Failed to record report for event {}: {}", event_id, e),
                }
                Some(report_ref)
            }
            Err(e) => {
                error!(
                    "Report export failed for stopped event {}: {}. The export endpoint can regenerate it.",
                    event_id, e
                );
                None
            }
        };

        Ok(StoppedEvent {
            event,
            aggregate,
            report_ref,
        })
    }

    fn get_event(&self, event_id: &str) -> Result<Event> {
        self.event_repository.get_by_id(event_id)
    }

    fn list_events(&self) -> Result<Vec<Event>> {
        self.event_repository.list()
    }
}
