//! Event streaming Relay
//!
//! A Relay is the sending half of an unbounded channel. The registry's
//! dispatch point is a `Relay<Action>`; the receiving half is handed to the
//! background controller.

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Type-safe, fire-and-forget event relay.
///
/// Clones share the same channel and the same sent-event counter.
///
/// # Examples
///
/// ```rust
/// use frontend::dataflow::relay;
///
/// let (action_dispatched_relay, mut action_stream) = relay::<u32>();
/// action_dispatched_relay.send(7);
/// assert_eq!(action_stream.try_next().unwrap(), Some(7));
/// ```
#[derive(Clone, Debug)]
pub struct Relay<T>
where
    T: Send + 'static,
{
    sender: UnboundedSender<T>,
    sent: Arc<AtomicU64>,
}

/// Error type for Relay operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// The receiver has been dropped
    #[error("relay channel closed")]
    ChannelClosed,
}

impl<T> Relay<T>
where
    T: Send + 'static,
{
    /// Create a new Relay with an associated receiver stream.
    pub fn new() -> (Self, UnboundedReceiver<T>) {
        let (sender, receiver) = unbounded();
        (
            Relay {
                sender,
                sent: Arc::new(AtomicU64::new(0)),
            },
            receiver,
        )
    }

    /// Send an event through the relay.
    ///
    /// If the receiver has been dropped the event is discarded and logged.
    pub fn send(&self, value: T) {
        if self.try_send(value).is_err() {
            log::warn!("Relay receiver dropped, event discarded");
        }
    }

    /// Send an event, reporting a closed channel to the caller.
    pub fn try_send(&self, value: T) -> Result<(), RelayError> {
        self.sender
            .unbounded_send(value)
            .map_err(|_| RelayError::ChannelClosed)?;
        self.sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Number of events successfully handed to the channel.
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl<T> Default for Relay<T>
where
    T: Send + 'static,
{
    /// A disconnected relay: every event is discarded.
    fn default() -> Self {
        let (relay, _receiver) = Self::new();
        relay
    }
}

/// Creates a new Relay with an associated receiver stream.
pub fn relay<T>() -> (Relay<T>, UnboundedReceiver<T>)
where
    T: Send + 'static,
{
    Relay::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_relay_basic_functionality() {
        let (relay, mut receiver) = Relay::new();

        relay.send("test_event".to_string());

        let received = receiver.next().await;
        assert_eq!(received, Some("test_event".to_string()));
        assert_eq!(relay.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_relay_try_send() {
        let (relay, mut receiver) = Relay::new();

        assert!(relay.try_send("test".to_string()).is_ok());
        assert_eq!(receiver.next().await, Some("test".to_string()));

        drop(receiver);

        assert_eq!(
            relay.try_send("fail".to_string()),
            Err(RelayError::ChannelClosed)
        );
        assert!(relay.is_closed());
        assert_eq!(relay.sent_count(), 1);
    }

    #[test]
    fn test_relay_clones_share_channel() {
        let (relay, mut stream) = relay::<u8>();
        let other = relay.clone();

        relay.send(1);
        other.send(2);

        assert_eq!(stream.try_next().unwrap(), Some(1));
        assert_eq!(stream.try_next().unwrap(), Some(2));
        assert_eq!(relay.sent_count(), 2);
    }

    #[test]
    fn test_default_relay_is_disconnected() {
        let relay = Relay::<u8>::default();
        assert!(relay.is_closed());
        relay.send(1);
        assert_eq!(relay.sent_count(), 0);
    }
}
