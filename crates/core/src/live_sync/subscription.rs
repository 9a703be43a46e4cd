use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::stream::{self, Stream};
use tokio::sync::Notify;

use super::sync_model::{SyncDelta, SyncMessage};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Bounded per-subscriber queue. Producers never wait on it.
#[derive(Debug)]
pub(crate) struct SubscriberQueue {
    pub(crate) id: u64,
    pub(crate) event_id: String,
    capacity: usize,
    deltas: Mutex<VecDeque<SyncDelta>>,
    notify: Notify,
    resync: AtomicBool,
    closed: AtomicBool,
}

impl SubscriberQueue {
    pub(crate) fn new(id: u64, event_id: &str, capacity: usize) -> Self {
        Self {
            id,
            event_id: event_id.to_string(),
            capacity: capacity.max(1),
            deltas: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            resync: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// Enqueues a delta, dropping the oldest one when full.
    /// Returns true if something was dropped.
    pub(crate) fn push(&self, delta: SyncDelta) -> bool {
        let overflowed = {
            let mut deltas = lock(&self.deltas);
            let overflowed = deltas.len() >= self.capacity;
            if overflowed {
                deltas.pop_front();
                self.resync.store(true, Ordering::SeqCst);
            }
            deltas.push_back(delta);
            overflowed
        };
        self.notify.notify_one();
        overflowed
    }

    pub(crate) fn flag_resync(&self) {
        self.resync.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn take(&self) -> Option<SyncMessage> {
        if self.resync.swap(false, Ordering::SeqCst) {
            return Some(SyncMessage::ResyncRequired {
                event_id: self.event_id.clone(),
            });
        }
        lock(&self.deltas).pop_front().map(SyncMessage::Delta)
    }
}

/// A dashboard's ordered view of one event's deltas.
///
/// Ends after the `EventStopped` delta. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    queue: Arc<SubscriberQueue>,
    finished: bool,
}

impl Subscription {
    pub(crate) fn new(queue: Arc<SubscriberQueue>) -> Self {
        Self {
            queue,
            finished: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.queue.id
    }

    pub fn event_id(&self) -> &str {
        &self.queue.event_id
    }

    /// Waits for the next message; `None` once the event has stopped.
    pub async fn next(&mut self) -> Option<SyncMessage> {
        if self.finished {
            return None;
        }
        loop {
            if let Some(message) = self.try_next() {
                return Some(message);
            }
            self.queue.notify.notified().await;
        }
    }

    /// Returns a pending message without waiting.
    pub fn try_next(&mut self) -> Option<SyncMessage> {
        if self.finished {
            return None;
        }
        let message = self.queue.take()?;
        if let SyncMessage::Delta(delta) = &message {
            if delta.is_terminal() {
                self.finished = true;
            }
        }
        Some(message)
    }

    pub fn into_stream(self) -> impl Stream<Item = SyncMessage> + Send {
        stream::unfold(self, |mut subscription| async move {
            subscription
                .next()
                .await
                .map(|message| (message, subscription))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.queue.closed.store(true, Ordering::SeqCst);
    }
}
