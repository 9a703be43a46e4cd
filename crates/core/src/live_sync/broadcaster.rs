//! Push fan-out of ledger deltas to dashboard subscribers.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};

use super::subscription::{lock, SubscriberQueue, Subscription};
use super::sync_model::SyncDelta;
use crate::constants::{DEFAULT_SEQ_GAP_TIMEOUT, DEFAULT_SUBSCRIBER_QUEUE_CAPACITY};
use crate::events::{DomainEvent, DomainEventSink};

/// Per-event ordering state and subscriber list.
#[derive(Debug)]
struct EventChannel {
    released_seq: i64,
    pending: BTreeMap<i64, SyncDelta>,
    pending_stop: Option<(i64, SyncDelta)>,
    stop_delta: Option<SyncDelta>,
    subscribers: Vec<Arc<SubscriberQueue>>,
    gap_timer_armed: bool,
}

impl EventChannel {
    fn new(released_seq: i64) -> Self {
        Self {
            released_seq,
            pending: BTreeMap::new(),
            pending_stop: None,
            stop_delta: None,
            subscribers: Vec::new(),
            gap_timer_armed: false,
        }
    }

    /// True while something is held back behind a missing seq.
    fn is_blocked(&self) -> bool {
        !self.pending.is_empty() || self.pending_stop.is_some()
    }

    fn accept(&mut self, delta: SyncDelta, after_seq: i64, buffer_capacity: usize) {
        if delta.is_terminal() {
            if self.stop_delta.is_some() || self.pending_stop.is_some() {
                return;
            }
            self.pending_stop = Some((after_seq, delta));
        } else if after_seq <= self.released_seq {
            debug!(
                "Ignoring already released seq {} for event {}",
                after_seq, delta.event_id
            );
            return;
        } else {
            self.pending.insert(after_seq, delta);
        }

        self.release_ready();

        if self.pending.len() > buffer_capacity {
            warn!(
                "Reorder buffer overflow at seq {} ({} waiting) for event {}",
                self.released_seq,
                self.pending.len(),
                delta_event_id(&self.pending)
            );
            self.skip_gap();
        }
    }

    /// Gives up on the missing seqs: releases everything held back in order
    /// and flags every subscriber to refetch the snapshot.
    fn skip_gap(&mut self) {
        let missing_after = self.released_seq;
        let waiting = std::mem::take(&mut self.pending);
        for (seq, delta) in waiting {
            self.released_seq = seq;
            self.deliver(delta);
        }
        if let Some((after, _)) = &self.pending_stop {
            self.released_seq = self.released_seq.max(*after);
        }
        info!(
            "Skipped missing seq(s) after {}; flagging {} subscriber(s) for resync",
            missing_after,
            self.subscribers.len()
        );
        for subscriber in &self.subscribers {
            subscriber.flag_resync();
        }
        self.release_ready();
    }

    fn release_ready(&mut self) {
        while let Some(delta) = self.pending.remove(&(self.released_seq + 1)) {
            self.released_seq += 1;
            self.deliver(delta);
        }

        let stop_ready = matches!(&self.pending_stop, Some((after, _)) if self.released_seq >= *after);
        if stop_ready {
            if let Some((_, delta)) = self.pending_stop.take() {
                self.deliver(delta.clone());
                self.stop_delta = Some(delta);
            }
        }
    }

    fn deliver(&mut self, delta: SyncDelta) {
        self.subscribers.retain(|subscriber| {
            if subscriber.is_closed() {
                info!(
                    "Subscriber {} for event {} disconnected; removing it",
                    subscriber.id, subscriber.event_id
                );
                false
            } else {
                true
            }
        });

        for subscriber in &self.subscribers {
            if subscriber.push(delta.clone()) {
                warn!(
                    "Subscriber {} for event {} fell behind; oldest delta dropped, resync flagged",
                    subscriber.id, subscriber.event_id
                );
            }
        }
    }
}

fn delta_event_id(pending: &BTreeMap<i64, SyncDelta>) -> &str {
    pending
        .values()
        .next()
        .map(|delta| delta.event_id.as_str())
        .unwrap_or_default()
}

struct BroadcasterInner {
    capacity: usize,
    gap_timeout: Duration,
    next_subscriber_id: AtomicU64,
    channels: Mutex<HashMap<String, EventChannel>>,
}

/// Fans committed ledger deltas out to every dashboard of an event.
///
/// Deltas are released strictly in seq order per event; `emit` never waits
/// on a subscriber. A seq that is never emitted holds later deltas back for
/// at most the gap timeout, after which subscribers are flagged for resync.
#[derive(Clone)]
pub struct LiveSyncBroadcaster {
    inner: Arc<BroadcasterInner>,
}

impl Default for LiveSyncBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_QUEUE_CAPACITY)
    }
}

impl LiveSyncBroadcaster {
    pub fn new(capacity: usize) -> Self {
        Self::with_gap_timeout(capacity, DEFAULT_SEQ_GAP_TIMEOUT)
    }

    pub fn with_gap_timeout(capacity: usize, gap_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(BroadcasterInner {
                capacity: capacity.max(1),
                gap_timeout,
                next_subscriber_id: AtomicU64::new(1),
                channels: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Sets the ordering baseline for an event whose ledger already has
    /// entries up to `last_seq`. No-op if the event is already tracked.
    pub fn prime(&self, event_id: &str, last_seq: i64) {
        lock(&self.inner.channels)
            .entry(event_id.to_string())
            .or_insert_with(|| EventChannel::new(last_seq));
    }

    /// Subscribes to an event. `last_seq` is the seq of the snapshot the
    /// caller already holds.
    pub fn subscribe(&self, event_id: &str, last_seq: i64) -> Subscription {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let queue = Arc::new(SubscriberQueue::new(id, event_id, self.inner.capacity));

        let mut channels = lock(&self.inner.channels);
        let channel = channels
            .entry(event_id.to_string())
            .or_insert_with(|| EventChannel::new(last_seq));
        if let Some(stop) = &channel.stop_delta {
            queue.push(stop.clone());
        }
        channel.subscribers.push(queue.clone());
        debug!(
            "Subscriber {} joined event {} ({} total)",
            id,
            event_id,
            channel.subscribers.len()
        );
        Subscription::new(queue)
    }

    pub fn subscriber_count(&self, event_id: &str) -> usize {
        lock(&self.inner.channels)
            .get(event_id)
            .map(|channel| {
                channel
                    .subscribers
                    .iter()
                    .filter(|subscriber| !subscriber.is_closed())
                    .count()
            })
            .unwrap_or(0)
    }

    /// Schedules a gap check if the channel is blocked and none is pending.
    ///
    /// Without a tokio runtime the gap is only resolved by a later emit or by
    /// reorder buffer overflow.
    fn arm_gap_timer(&self, event_id: &str, channel: &mut EventChannel) {
        if channel.gap_timer_armed || !channel.is_blocked() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime to time out the seq gap of event {}", event_id);
            return;
        };
        channel.gap_timer_armed = true;

        let broadcaster = self.clone();
        let event_id = event_id.to_string();
        let released_at_arm = channel.released_seq;
        let timeout = self.inner.gap_timeout;
        runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            broadcaster.close_gap(&event_id, released_at_arm);
        });
    }

    fn close_gap(&self, event_id: &str, released_at_arm: i64) {
        let mut channels = lock(&self.inner.channels);
        let Some(channel) = channels.get_mut(event_id) else {
            return;
        };
        channel.gap_timer_armed = false;
        if !channel.is_blocked() {
            return;
        }
        if channel.released_seq == released_at_arm {
            warn!(
                "Seq {} of event {} was not published within {:?}",
                channel.released_seq + 1,
                event_id,
                self.inner.gap_timeout
            );
            channel.skip_gap();
        } else {
            // Progress since the timer was armed; wait on the new gap.
            self.arm_gap_timer(event_id, channel);
        }
    }
}

impl DomainEventSink for LiveSyncBroadcaster {
    fn emit(&self, event: DomainEvent) {
        if let DomainEvent::EventStarted { event } = &event {
            self.prime(&event.id, 0);
            return;
        }

        let Some((delta, after_seq)) = SyncDelta::from_domain_event(&event) else {
            return;
        };

        let mut channels = lock(&self.inner.channels);
        let channel = channels.entry(delta.event_id.clone()).or_insert_with(|| {
            let baseline = if delta.is_terminal() {
                after_seq
            } else {
                after_seq - 1
            };
            debug!(
                "Tracking event {} from seq {}",
                delta.event_id, baseline
            );
            EventChannel::new(baseline)
        });
        let event_id = delta.event_id.clone();
        channel.accept(delta, after_seq, self.inner.capacity);
        self.arm_gap_timer(&event_id, channel);
    }
}
