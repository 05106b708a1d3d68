//! jobdeck-core - auth and session state for jobdeck clients.
//!
//! This crate is the client-side core of the jobdeck job board: the
//! session store with durable persistence, the auth gateway over the
//! REST API, and the navigation guards. It renders nothing and performs
//! no navigation itself; a shell (desktop app, TUI, test harness) wires
//! the pieces together and acts on the decisions they return.
//!
//! Typical wiring:
//!
//! ```no_run
//! use jobdeck_core::api::ApiClient;
//! use jobdeck_core::auth::AuthGateway;
//! use jobdeck_core::config::Config;
//! use jobdeck_core::session::SessionStore;
//! use jobdeck_core::storage::StorageManager;
//!
//! # async fn wire() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let storage = StorageManager::new(config.storage_dir()?)?;
//! let store = SessionStore::new(storage);
//! store.load_from_storage().await;
//!
//! let api = ApiClient::new(&config.api_base_url)?;
//! let gateway = AuthGateway::new(api, store.clone()).with_config(config);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod guard;
pub mod models;
pub mod session;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthError, AuthGateway, OauthCallback, OauthFlow, OauthIntent, OauthPhase};
pub use config::Config;
pub use guard::{GateDecision, ProfileGate, Redirect, RouteDecision, RouteGuard};
pub use models::{OauthProvider, ProfileCompletion, Role, UserSummary};
pub use session::{PendingVerification, RequestSeq, Session, SessionRecord, SessionStore};
pub use storage::StorageManager;
