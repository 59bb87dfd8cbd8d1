//! # Event Subscription
//!
//! The handle a registration yields. It ends in one of three ways:
//!
//! - unregistered: the next read returns `None`, buffered events are discarded;
//! - hub disconnected: one `Err(EventHubError::Disconnected)`, then `None`;
//! - hub dropped: `None` once the bus closes.

use crate::domain::errors::EventHubError;
use shared_bus::{ChannelEvent, EventStream, Subscription, SubscriptionError};
use shared_types::PeerName;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::sync::oneshot;
use tokio_stream::Stream;

/// Item type of every subscription.
pub type EventResult = Result<ChannelEvent, EventHubError>;

/// Explicit unregister versus the hub forgetting the registration.
struct CancelSignal {
    receiver: oneshot::Receiver<()>,
    armed: bool,
}

impl CancelSignal {
    fn new(receiver: oneshot::Receiver<()>) -> Self {
        Self {
            receiver,
            armed: true,
        }
    }

    /// True once `unregister` fired. A dropped sender disarms the signal and
    /// leaves the subscription to end through the bus.
    fn poll_cancelled(&mut self, cx: &mut Context<'_>) -> bool {
        if !self.armed {
            return false;
        }
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(())) => true,
            Poll::Ready(Err(_)) => {
                self.armed = false;
                false
            }
            Poll::Pending => false,
        }
    }

    fn try_cancelled(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        match self.receiver.try_recv() {
            Ok(()) => true,
            Err(oneshot::error::TryRecvError::Empty) => false,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.armed = false;
                false
            }
        }
    }
}

fn settle(peer: &PeerName, finished: &mut bool, event: Option<ChannelEvent>) -> Option<EventResult> {
    match event {
        None => {
            *finished = true;
            None
        }
        Some(ChannelEvent::Disconnected { reason, .. }) => {
            *finished = true;
            Some(Err(EventHubError::Disconnected {
                peer: peer.clone(),
                reason,
            }))
        }
        Some(event) => Some(Ok(event)),
    }
}

/// Events matching one registration.
pub struct EventSubscription {
    peer: PeerName,
    inner: Subscription,
    cancel: CancelSignal,
    finished: bool,
}

impl EventSubscription {
    pub(crate) fn new(peer: PeerName, inner: Subscription, cancel: oneshot::Receiver<()>) -> Self {
        Self {
            peer,
            inner,
            cancel: CancelSignal::new(cancel),
            finished: false,
        }
    }

    /// Peer whose hub produced this subscription.
    #[must_use]
    pub fn peer(&self) -> &PeerName {
        &self.peer
    }

    /// Next matching event; `None` once the subscription has ended.
    pub async fn recv(&mut self) -> Option<EventResult> {
        if self.finished {
            return None;
        }

        let cancel = &mut self.cancel;
        let next = tokio::select! {
            biased;
            () = std::future::poll_fn(|cx| {
                if cancel.poll_cancelled(cx) {
                    Poll::Ready(())
                } else {
                    Poll::Pending
                }
            }) => None,
            event = self.inner.recv() => Some(event),
        };

        match next {
            None => {
                self.finished = true;
                None
            }
            Some(event) => settle(&self.peer, &mut self.finished, event),
        }
    }

    /// Next buffered event without waiting. `Ok(None)` means nothing is
    /// buffered yet.
    pub fn try_recv(&mut self) -> Result<Option<ChannelEvent>, EventHubError> {
        if self.finished {
            return Err(EventHubError::SubscriptionClosed);
        }
        if self.cancel.try_cancelled() {
            self.finished = true;
            return Err(EventHubError::SubscriptionClosed);
        }
        match self.inner.try_recv() {
            Ok(None) => Ok(None),
            Ok(Some(event)) => settle(&self.peer, &mut self.finished, Some(event)).transpose(),
            Err(SubscriptionError::Closed) => {
                self.finished = true;
                Err(EventHubError::SubscriptionClosed)
            }
        }
    }

    /// Convert into a `Stream` with the same ending rules.
    #[must_use]
    pub fn into_stream(self) -> RegistrationStream {
        RegistrationStream {
            peer: self.peer,
            inner: self.inner.into_stream(),
            cancel: self.cancel,
            finished: self.finished,
        }
    }
}

/// Stream form of an [`EventSubscription`].
pub struct RegistrationStream {
    peer: PeerName,
    inner: EventStream,
    cancel: CancelSignal,
    finished: bool,
}

impl Stream for RegistrationStream {
    type Item = EventResult;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        if this.cancel.poll_cancelled(cx) {
            this.finished = true;
            return Poll::Ready(None);
        }
        let event = ready!(Pin::new(&mut this.inner).poll_next(cx));
        Poll::Ready(settle(&this.peer, &mut this.finished, event))
    }
}
