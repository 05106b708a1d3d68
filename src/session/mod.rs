//! Session state management.
//!
//! This module provides:
//! - `SessionStore`: shared auth state with sequenced writes
//! - `Session`: point-in-time snapshot handed to guards and UI code
//! - `SessionRecord`: the durable on-disk form, expiring after 7 days
//! - `PendingVerification`: register-to-verify bridge state
//!
//! Sessions are persisted to disk and rehydrated once at startup.

pub mod record;
pub mod store;

pub use record::{PendingVerification, SessionRecord};
pub use store::{RequestSeq, Session, SessionStore};
