//! # Event Subscriber
//!
//! Receiving side of the bus. Each live subscription holds a lease on the
//! topics its filter accepts, so publishers can ask how many consumers are
//! listening for tracking or membership events.
//!
//! Consumers that fall behind lose events; `missed()` reports how many. The
//! tracking log in the engine stays authoritative, so a lagging consumer
//! re-reads it instead of relying on the bus.

use crate::events::{EventFilter, EventTopic, LogisticsEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// Live subscription counts per routed topic.
#[derive(Debug, Default)]
pub(crate) struct ListenerRegistry {
    counts: Mutex<HashMap<EventTopic, usize>>,
}

impl ListenerRegistry {
    pub(crate) fn lease(self: &Arc<Self>, filter: &EventFilter) -> ListenerLease {
        let topics: Vec<EventTopic> = EventTopic::ROUTED
            .into_iter()
            .filter(|topic| filter.accepts_topic(*topic))
            .collect();
        let mut counts = self.counts.lock();
        for topic in &topics {
            *counts.entry(*topic).or_insert(0) += 1;
        }
        ListenerLease {
            registry: Arc::clone(self),
            topics,
        }
    }

    pub(crate) fn listeners(&self, topic: EventTopic) -> usize {
        let counts = self.counts.lock();
        match topic {
            EventTopic::All => counts.values().copied().max().unwrap_or(0),
            routed => counts.get(&routed).copied().unwrap_or(0),
        }
    }

    fn release(&self, topics: &[EventTopic]) {
        let mut counts = self.counts.lock();
        for topic in topics {
            if let Some(count) = counts.get_mut(topic) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    counts.remove(topic);
                }
            }
        }
    }
}

/// Returns the topic counts to the registry when the subscription goes away.
pub(crate) struct ListenerLease {
    registry: Arc<ListenerRegistry>,
    topics: Vec<EventTopic>,
}

impl Drop for ListenerLease {
    fn drop(&mut self) {
        self.registry.release(&self.topics);
        debug!(topics = ?self.topics, "Subscription released");
    }
}

/// A filtered view of the bus.
pub struct Subscription {
    receiver: broadcast::Receiver<LogisticsEvent>,
    filter: EventFilter,
    lease: ListenerLease,
    missed: u64,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<LogisticsEvent>,
        filter: EventFilter,
        lease: ListenerLease,
    ) -> Self {
        Self {
            receiver,
            filter,
            lease,
            missed: 0,
        }
    }

    /// Wait for the next matching event. `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<LogisticsEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(count)) => self.record_lag(count),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next buffered matching event, if any.
    ///
    /// # Errors
    ///
    /// `SubscriptionError::Closed` once the bus has been dropped.
    pub fn try_recv(&mut self) -> Result<Option<LogisticsEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(TryRecvError::Lagged(count)) => self.record_lag(count),
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    /// Every matching event currently buffered, oldest first.
    pub fn drain(&mut self) -> Vec<LogisticsEvent> {
        let mut events = Vec::new();
        while let Ok(Some(event)) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Events lost because this subscriber fell behind.
    #[must_use]
    pub fn missed(&self) -> u64 {
        self.missed
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    fn record_lag(&mut self, count: u64) {
        self.missed += count;
        debug!(lagged = count, missed = self.missed, "Subscriber fell behind");
    }
}

/// `Stream` adapter over a subscription.
pub struct EventStream {
    inner: BroadcastStream<LogisticsEvent>,
    filter: EventFilter,
    missed: u64,
    _lease: ListenerLease,
}

impl EventStream {
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        let Subscription {
            receiver,
            filter,
            lease,
            missed,
        } = subscription;
        Self {
            inner: BroadcastStream::new(receiver),
            filter,
            missed,
            _lease: lease,
        }
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Events lost because this stream fell behind.
    #[must_use]
    pub fn missed(&self) -> u64 {
        self.missed
    }
}

impl Stream for EventStream {
    type Item = LogisticsEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) if self.filter.matches(&event) => {
                    return Poll::Ready(Some(event))
                }
                Poll::Ready(Some(Ok(_))) => {}
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    self.missed += count;
                    debug!(lagged = count, "Event stream fell behind");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
