//! `reviso-events` — in-process publish/subscribe used to propagate session
//! state changes to their observers.

pub mod bus;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
