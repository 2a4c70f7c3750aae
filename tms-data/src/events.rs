//! Fan-out of dispatch events to real-time subscribers.
//!
//! Each subscriber owns a bounded Tokio channel. Publishing never waits on
//! a slow subscriber unless [`Backpressure::Block`] is configured.

use std::sync::Arc;

use parking_lot::Mutex;
use tms_core::{DispatchEvent, EventSink, SinkError};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};

/// Default per-subscriber queue length.
const DEFAULT_CAPACITY: usize = 256;

/// What to do when a subscriber's queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backpressure {
    /// Discard the event for that subscriber and log it.
    #[default]
    DropNewest,
    /// Wait for room in the subscriber's queue.
    ///
    /// Inside a `current_thread` runtime waiting would stall the executor,
    /// so the hub falls back to dropping there.
    Block,
}

/// Configuration for [`EventHub`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventHubConfig {
    /// Queue length of each subscription. Zero is treated as one.
    pub capacity: usize,
    /// Full-queue policy.
    pub backpressure: Backpressure,
}

impl Default for EventHubConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            backpressure: Backpressure::default(),
        }
    }
}

#[derive(Debug, Default)]
struct HubState {
    subscribers: Vec<Sender<DispatchEvent>>,
    closed: bool,
    dropped: u64,
}

/// [`EventSink`] that fans events out to every live [`Subscription`].
///
/// Cloning the hub shares its subscribers.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use serde_json::json;
/// use tms_core::{DispatchEvent, EventKind, EventSink};
/// use tms_data::EventHub;
///
/// let hub = EventHub::default();
/// let mut subscription = hub.subscribe();
/// hub.publish(DispatchEvent {
///     kind: EventKind::StatusUpdate,
///     payload: json!({"status": "completed"}),
///     emitted_at: Utc::now(),
/// })?;
/// assert!(subscription.try_recv().is_some());
/// # Ok::<(), tms_core::SinkError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventHub {
    config: EventHubConfig,
    state: Arc<Mutex<HubState>>,
}

impl EventHub {
    /// Create a hub with explicit configuration.
    #[must_use]
    pub fn with_config(config: EventHubConfig) -> Self {
        Self {
            config,
            state: Arc::default(),
        }
    }

    /// Register a new subscriber.
    ///
    /// Subscribing to a closed hub yields a subscription that is already
    /// finished.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.config.capacity.max(1));
        let mut state = self.state.lock();
        if !state.closed {
            state.subscribers.push(sender);
        }
        Subscription { receiver }
    }

    /// Number of subscribers still listening.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.state.lock();
        state.subscribers.retain(|sender| !sender.is_closed());
        state.subscribers.len()
    }

    /// Events discarded because a subscriber's queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.state.lock().dropped
    }

    /// Stop accepting events and finish every subscription.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.subscribers.clear();
    }

    fn deliver(&self, sender: &Sender<DispatchEvent>, event: DispatchEvent) -> bool {
        let pending = match sender.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => return true,
            Err(TrySendError::Full(pending)) => pending,
        };
        if self.config.backpressure == Backpressure::DropNewest {
            return false;
        }
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(sender.send(pending))).is_ok()
            }
            Ok(_) => false,
            Err(_) => sender.blocking_send(pending).is_ok(),
        }
    }
}

impl EventSink for EventHub {
    fn publish(&self, event: DispatchEvent) -> Result<(), SinkError> {
        let subscribers = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(SinkError::Closed);
            }
            state.subscribers.retain(|sender| !sender.is_closed());
            state.subscribers.clone()
        };

        let mut dropped = 0_u64;
        for sender in &subscribers {
            if !self.deliver(sender, event.clone()) {
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::warn!(
                "dropped {:?} event for {dropped} of {} subscribers with full queues",
                event.kind,
                subscribers.len()
            );
            self.state.lock().dropped += dropped;
        }
        Ok(())
    }
}

/// Receiving end of an [`EventHub`] subscription.
///
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<DispatchEvent>,
}

impl Subscription {
    /// Wait for the next event. Returns `None` once the hub is closed and
    /// the queue drained.
    pub async fn recv(&mut self) -> Option<DispatchEvent> {
        self.receiver.recv().await
    }

    /// Next queued event, without waiting.
    pub fn try_recv(&mut self) -> Option<DispatchEvent> {
        self.receiver.try_recv().ok()
    }

    /// Drain every queued event.
    pub fn drain(&mut self) -> Vec<DispatchEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;
    use tms_core::EventKind;

    fn event(kind: EventKind) -> DispatchEvent {
        DispatchEvent {
            kind,
            payload: json!({}),
            emitted_at: Utc::now(),
        }
    }

    #[rstest]
    fn every_subscriber_receives_each_event() {
        let hub = EventHub::default();
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        hub.publish(event(EventKind::StopAdded)).expect("publish");

        assert_eq!(first.drain().len(), 1);
        assert_eq!(second.drain().len(), 1);
    }

    #[rstest]
    fn full_queues_drop_newest_events() {
        let hub = EventHub::with_config(EventHubConfig {
            capacity: 1,
            backpressure: Backpressure::DropNewest,
        });
        let mut subscription = hub.subscribe();

        hub.publish(event(EventKind::StopAdded)).expect("publish");
        hub.publish(event(EventKind::StopRemoved)).expect("publish");

        let received: Vec<EventKind> = subscription.drain().into_iter().map(|e| e.kind).collect();
        assert_eq!(received, vec![EventKind::StopAdded]);
        assert_eq!(hub.dropped(), 1);
    }

    #[rstest]
    fn dropped_subscriptions_are_pruned() {
        let hub = EventHub::default();
        let kept = hub.subscribe();
        drop(hub.subscribe());

        hub.publish(event(EventKind::StatusUpdate)).expect("publish");

        assert_eq!(hub.subscriber_count(), 1);
        drop(kept);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[rstest]
    fn closed_hub_rejects_events() {
        let hub = EventHub::default();
        let mut subscription = hub.subscribe();
        hub.close();

        let err = hub
            .publish(event(EventKind::RouteReassigned))
            .expect_err("closed");

        assert_eq!(err, SinkError::Closed);
        assert!(subscription.try_recv().is_none());
    }

    #[rstest]
    fn zero_capacity_is_treated_as_one() {
        let hub = EventHub::with_config(EventHubConfig {
            capacity: 0,
            ..EventHubConfig::default()
        });
        let mut subscription = hub.subscribe();

        hub.publish(event(EventKind::AlertUpdate)).expect("publish");

        assert!(subscription.try_recv().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn blocking_hub_waits_for_room() {
        let hub = EventHub::with_config(EventHubConfig {
            capacity: 1,
            backpressure: Backpressure::Block,
        });
        let mut subscription = hub.subscribe();
        let publisher = hub.clone();
        let task = tokio::task::spawn_blocking(move || {
            for kind in [EventKind::StopAdded, EventKind::StopRemoved] {
                publisher.publish(event(kind)).expect("publish");
            }
        });

        let first = subscription.recv().await.map(|e| e.kind);
        let second = subscription.recv().await.map(|e| e.kind);
        task.await.expect("publisher finishes");

        assert_eq!(first, Some(EventKind::StopAdded));
        assert_eq!(second, Some(EventKind::StopRemoved));
        assert_eq!(hub.dropped(), 0);
    }
}
