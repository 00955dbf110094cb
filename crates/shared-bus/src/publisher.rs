//! # Event Publisher
//!
//! Publishing side of the bus. Events fan out to every receiver and are
//! filtered on receive; publish counts are kept per topic so operators can
//! compare tracking volume against lifecycle volume.

use crate::events::{EventFilter, EventTopic, LogisticsEvent};
use crate::subscriber::{EventStream, ListenerRegistry, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Trait for publishing events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event. Returns how many receivers it reached.
    async fn publish(&self, event: LogisticsEvent) -> usize;

    /// Total events published, delivered or not.
    fn events_published(&self) -> u64;
}

#[derive(Debug, Default)]
struct TopicCounters {
    lifecycle: AtomicU64,
    membership: AtomicU64,
    tracking: AtomicU64,
}

impl TopicCounters {
    fn slot(&self, topic: EventTopic) -> Option<&AtomicU64> {
        match topic {
            EventTopic::Lifecycle => Some(&self.lifecycle),
            EventTopic::Membership => Some(&self.membership),
            EventTopic::Tracking => Some(&self.tracking),
            EventTopic::All => None,
        }
    }

    fn get(&self, topic: EventTopic) -> u64 {
        match self.slot(topic) {
            Some(counter) => counter.load(Ordering::Relaxed),
            None => EventTopic::ROUTED.iter().map(|t| self.get(*t)).sum(),
        }
    }
}

/// Broadcast-backed event bus for a single process.
///
/// Publishing with no subscribers drops the event.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<LogisticsEvent>,
    listeners: Arc<ListenerRegistry>,
    published: TopicCounters,
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// `capacity` events are buffered per subscriber before it starts to lag.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            listeners: Arc::new(ListenerRegistry::default()),
            published: TopicCounters::default(),
            capacity,
        }
    }

    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let lease = self.listeners.lease(&filter);
        debug!(topics = ?filter.topics, orgs = filter.orgs.len(), "Subscription opened");
        Subscription::new(receiver, filter, lease)
    }

    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Live subscriptions whose filter accepts `topic`.
    ///
    /// For `EventTopic::All` this is the busiest routed topic.
    #[must_use]
    pub fn listeners(&self, topic: EventTopic) -> usize {
        self.listeners.listeners(topic)
    }

    /// Raw receiver count, regardless of filters.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Events published on `topic`; `EventTopic::All` sums every topic.
    #[must_use]
    pub fn published_on(&self, topic: EventTopic) -> u64 {
        self.published.get(topic)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: LogisticsEvent) -> usize {
        let topic = event.topic();
        let org_id = event.org_id();
        if let Some(counter) = self.published.slot(topic) {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        // Err only means nobody is subscribed
        let receivers = self.sender.send(event).unwrap_or(0);
        trace!(topic = ?topic, org_id = %org_id, receivers, "Event published");
        receivers
    }

    fn events_published(&self) -> u64 {
        self.published.get(EventTopic::All)
    }
}
