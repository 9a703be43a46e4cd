use pledgeboard_core::events::{DomainEvent, DomainEventSink};
use pledgeboard_core::live_sync::LiveSyncBroadcaster;

/// Sink handed to every core service.
#[derive(Clone)]
pub struct WebDomainEventSink {
    broadcaster: LiveSyncBroadcaster,
}

impl WebDomainEventSink {
    pub fn new(broadcaster: LiveSyncBroadcaster) -> Self {
        Self { broadcaster }
    }
}

impl DomainEventSink for WebDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        match &event {
            DomainEvent::EventStarted { event } => {
                tracing::info!(event_id = %event.id, "Event started");
            }
            DomainEvent::DraftSubmitted {
                event_id,
                draft_id,
                status,
            } => {
                tracing::debug!(%event_id, %draft_id, status = status.as_str(), "Draft submitted");
            }
            DomainEvent::DonationConfirmed { entry, .. } => {
                tracing::debug!(event_id = %entry.event_id, seq = entry.seq, "Donation confirmed");
            }
            DomainEvent::DonationReversed { entry, .. } => {
                tracing::debug!(event_id = %entry.event_id, seq = entry.seq, "Donation reversed");
            }
            DomainEvent::EventStopped {
                event, last_seq, ..
            } => {
                tracing::info!(event_id = %event.id, last_seq, "Event stopped");
            }
        }
        self.broadcaster.emit(event);
    }
}
