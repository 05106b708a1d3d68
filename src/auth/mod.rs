//! Authentication flows against the jobdeck API.
//!
//! This module provides:
//! - `AuthGateway`: register/login/verify/reset operations that turn API
//!   responses into session-store mutations
//! - `OauthFlow`: the two-phase provider login (redirect, then callback)
//! - `AuthError`: flow-level failures with their forced redirects
//!
//! Registration never logs the user in, and verifying an email never
//! creates a session; login is always its own step.

pub mod error;
pub mod gateway;
pub mod oauth;

pub use error::AuthError;
pub use gateway::AuthGateway;
pub use oauth::{OauthCallback, OauthFlow, OauthIntent, OauthPhase};
