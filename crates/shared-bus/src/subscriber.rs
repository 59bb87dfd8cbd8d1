//! # Subscriptions
//!
//! The receiving half: a broadcast receiver narrowed by an [`EventFilter`].
//! Events a slow subscription missed are skipped and counted in
//! [`BusStats::lost`](crate::BusStats), never replayed.

use crate::events::{ChannelEvent, EventFilter};
use crate::publisher::BusStats;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::warn;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was dropped; nothing more will arrive.
    #[error("Channel event bus closed")]
    Closed,
}

fn note_lag(stats: &BusStats, filter: &EventFilter, missed: u64) {
    stats.record_lost(missed);
    warn!(missed, topics = ?filter.topics, "Subscription fell behind, events dropped");
}

pub struct Subscription {
    receiver: broadcast::Receiver<ChannelEvent>,
    filter: EventFilter,
    stats: Arc<BusStats>,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<ChannelEvent>,
        filter: EventFilter,
        stats: Arc<BusStats>,
    ) -> Self {
        Self {
            receiver,
            filter,
            stats,
        }
    }

    /// Next matching event; `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => note_lag(&self.stats, &self.filter, missed),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next buffered matching event. `Ok(None)` when nothing is buffered.
    pub fn try_recv(&mut self) -> Result<Option<ChannelEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(TryRecvError::Lagged(missed)) => note_lag(&self.stats, &self.filter, missed),
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    #[must_use]
    pub fn into_stream(self) -> EventStream {
        EventStream {
            inner: BroadcastStream::new(self.receiver),
            filter: self.filter,
            stats: self.stats,
        }
    }
}

/// [`Subscription`] as a `tokio_stream::Stream`.
pub struct EventStream {
    inner: BroadcastStream<ChannelEvent>,
    filter: EventFilter,
    stats: Arc<BusStats>,
}

impl EventStream {
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = ChannelEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match ready!(Pin::new(&mut this.inner).poll_next(cx)) {
                Some(Ok(event)) if this.filter.matches(&event) => return Poll::Ready(Some(event)),
                Some(Ok(_)) => {}
                Some(Err(BroadcastStreamRecvError::Lagged(missed))) => {
                    note_lag(&this.stats, &this.filter, missed);
                }
                None => return Poll::Ready(None),
            }
        }
    }
}
