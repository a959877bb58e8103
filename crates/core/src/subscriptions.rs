//! Bounded subscription channel for live query feeds.
//!
//! A `Subscription` is the consumer half of a bounded single-producer
//! channel. The producer half (`SubscriptionSink`) never blocks: a
//! subscriber that cancelled, dropped its handle, or fell a full buffer
//! behind is disconnected and observes end-of-stream on the next poll.
//! Publishers keep a sink per subscriber and prune disconnected sinks
//! on their next publish pass.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Create a linked sink/subscription pair with the given buffer capacity.
///
/// A capacity of zero is treated as one so the initial snapshot can
/// always be delivered.
pub fn subscription_channel<T>(capacity: usize) -> (SubscriptionSink<T>, Subscription<T>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let cancel = CancellationToken::new();
    let sink = SubscriptionSink { sender, cancel: cancel.clone() };
    (sink, Subscription { receiver, cancel })
}

/// Producer half of a subscription.
pub struct SubscriptionSink<T> {
    sender: mpsc::Sender<T>,
    cancel: CancellationToken,
}

impl<T> SubscriptionSink<T> {
    /// Deliver an item without blocking.
    ///
    /// Returns `false` once the subscriber is disconnected: either it
    /// cancelled, or its buffer is full. A full buffer disconnects the
    /// subscriber for good, so a slow consumer can never stall the
    /// publisher.
    pub fn publish(&self, item: T) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        match self.sender.try_send(item) {
            Ok(()) => true,
            Err(_) => {
                self.cancel.cancel();
                false
            }
        }
    }

    /// Whether the subscriber has been disconnected.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Consumer half of a subscription.
///
/// Dropping the handle cancels the subscription; the publisher frees the
/// slot on its next publish pass.
pub struct Subscription<T> {
    receiver: mpsc::Receiver<T>,
    cancel: CancellationToken,
}

impl<T> Subscription<T> {
    /// Wait for the next item.
    ///
    /// Returns `None` once the subscription is cancelled or the
    /// publisher is gone. Cancellation takes effect immediately, even
    /// when stale items are still buffered.
    pub async fn next(&mut self) -> Option<T> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            item = self.receiver.recv() => item,
        }
    }

    /// Cancel the subscription explicitly.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
