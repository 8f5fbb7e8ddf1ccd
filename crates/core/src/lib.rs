//! `reviso-core` — foundation building blocks shared by the session crates.
//!
//! This crate holds **pure** primitives (no storage, no IO).

pub mod clock;
pub mod error;
pub mod value_object;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use value_object::ValueObject;
