//! Server-sent dashboard stream.
//!
//! Every stream opens with a `snapshot` event, then carries ledger deltas in
//! seq order. A `ResyncRequired` event is followed by a fresh snapshot.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::stream::{self, Stream};
use pledgeboard_core::ledger::LedgerSnapshot;
use pledgeboard_core::lifecycle::EventState;
use pledgeboard_core::live_sync::{Subscription, SyncDelta, SyncMessage};
use serde::Serialize;
use serde_json::json;

use crate::{error::ApiResult, main_lib::AppState};

pub const SNAPSHOT_EVENT: &str = "snapshot";
pub const RESYNC_EVENT: &str = "ResyncRequired";

struct DashboardStream {
    state: Arc<AppState>,
    subscription: Subscription,
    last_seq: i64,
    queued: VecDeque<SseEvent>,
    finished: bool,
}

impl DashboardStream {
    fn new(state: Arc<AppState>, subscription: Subscription, snapshot: LedgerSnapshot) -> Self {
        let mut stream = Self {
            state,
            subscription,
            last_seq: 0,
            queued: VecDeque::new(),
            finished: false,
        };
        stream.queue_snapshot(snapshot);
        stream
    }

    fn queue_snapshot(&mut self, snapshot: LedgerSnapshot) {
        self.last_seq = snapshot.aggregate.last_seq;
        if snapshot.event_state == EventState::Stopped {
            self.finished = true;
        }
        if let Some(event) = sse_json(SNAPSHOT_EVENT, &snapshot) {
            self.queued.push_back(event);
        }
    }

    fn queue_delta(&mut self, delta: SyncDelta) {
        if let Some(seq) = delta.seq {
            // Already covered by the snapshot this stream sent.
            if seq <= self.last_seq {
                return;
            }
            self.last_seq = seq;
        }
        if delta.is_terminal() {
            self.finished = true;
        }
        if let Some(event) = sse_json(delta.kind.as_str(), &delta) {
            self.queued.push_back(event);
        }
    }

    fn queue_resync(&mut self, event_id: &str) {
        tracing::info!(
            "Subscriber {} for event {} fell behind; sending a fresh snapshot",
            self.subscription.id(),
            event_id
        );
        if let Some(event) = sse_json(RESYNC_EVENT, &json!({ "eventId": event_id })) {
            self.queued.push_back(event);
        }
        match self.state.ledger_service.snapshot(event_id) {
            Ok(snapshot) => self.queue_snapshot(snapshot),
            Err(e) => tracing::error!("Failed to load snapshot for {}: {}", event_id, e),
        }
    }

    async fn next_event(mut self) -> Option<(Result<SseEvent, Infallible>, Self)> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                return Some((Ok(event), self));
            }
            if self.finished {
                return None;
            }
            match self.subscription.next().await? {
                SyncMessage::Delta(delta) => self.queue_delta(delta),
                SyncMessage::ResyncRequired { event_id } => self.queue_resync(&event_id),
            }
        }
    }
}

fn sse_json<T: Serialize>(name: &str, payload: &T) -> Option<SseEvent> {
    match SseEvent::default().event(name).json_data(payload) {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::error!("Failed to serialize SSE payload for {}: {}", name, err);
            None
        }
    }
}

async fn stream_event(
    Path(event_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>> {
    // Subscribe before reading the snapshot so nothing committed in between
    // is lost; deltas the snapshot already covers are skipped.
    let baseline = state.ledger_service.aggregate(&event_id)?;
    let subscription = state.broadcaster.subscribe(&event_id, baseline.last_seq);
    let snapshot = state.ledger_service.snapshot(&event_id)?;
    tracing::debug!(
        "Subscriber {} joined event {} at seq {}",
        subscription.id(),
        event_id,
        snapshot.aggregate.last_seq
    );

    let dashboard = DashboardStream::new(state, subscription, snapshot);
    let stream = stream::unfold(dashboard, DashboardStream::next_event);

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/events/{id}/stream", get(stream_event))
}
