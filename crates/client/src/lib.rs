//! `reviso-client`
//!
//! **Responsibility:** the client-side session and onboarding state machine.
//!
//! This crate provides:
//! - Durable key-value storage (SQLite, in-memory for tests)
//! - The session store that owns the persisted session keys
//! - The session context pages read flags from and call `login`/`logout` on
//! - The navigation guard and the router that applies it
//!
//! The pure rules (expiry, profile validation, evaluation) live in
//! `reviso-auth`; this crate wires them to storage and navigation.

pub mod config;
pub mod context;
pub mod guard;
pub mod router;
pub mod storage;
pub mod store;

pub use config::ClientConfig;
pub use context::{SaveProfileError, SessionContext, SessionEvent, SessionEventKind};
pub use guard::{GuardRule, NavigationGuard, Redirect, RouteTable, decide, normalize_route};
pub use router::Router;
pub use storage::{InMemoryStorage, KeyValueStorage, SqliteStorage, StorageError};
pub use store::{SessionKeys, SessionStore};
