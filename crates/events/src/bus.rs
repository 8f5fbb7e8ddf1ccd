//! Publish/subscribe abstraction (mechanics only).
//!
//! Session state changes are announced on a bus instead of being discovered by
//! polling: the session context publishes, and anything that reacts to session
//! state (the navigation router, UI shells, tests) subscribes.
//!
//! - **Broadcast**: every subscription receives its own copy of each message.
//! - **In order**: a single publisher's messages arrive in publish order.
//! - **No persistence**: the bus distributes, the session store remembers.
//!
//! Consumers must tolerate seeing the same state twice; re-evaluating derived
//! session state is idempotent, so redundant delivery is harmless.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};

/// A subscription to a message stream.
///
/// ```ignore
/// let subscription = bus.subscribe();
/// for event in subscription.drain() {
///     react(event);
/// }
/// ```
///
/// Subscriptions are meant for a single consumer. Dropping one unregisters it
/// from the bus on the next publish.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Take every message that is already queued, oldest first.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Transport-agnostic pub/sub bus.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
