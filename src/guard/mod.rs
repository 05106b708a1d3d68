//! Navigation guards.
//!
//! Guards are pure decision functions over a [`Session`](crate::session::Session)
//! snapshot; navigation itself is modeled as data (`Redirect`) and carried
//! out by whatever shell embeds the crate.
//!
//! - `RouteGuard`: authentication and role checks per route
//! - `ProfileGate`: steers incomplete profiles to the setup page

use std::time::Duration;

pub mod profile;
pub mod route;

pub use profile::{GateDecision, ProfileGate, SETUP_PATH};
pub use route::{RouteDecision, RouteGuard};

/// A navigation the shell should perform, optionally after a pause
/// (used to keep a failure notice on screen before bouncing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    pub delay: Option<Duration>,
}

impl Redirect {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            to: path.into(),
            delay: None,
        }
    }

    pub fn delayed(path: impl Into<String>, delay: Duration) -> Self {
        Self {
            to: path.into(),
            delay: Some(delay),
        }
    }
}

impl std::fmt::Display for Redirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.delay {
            Some(d) => write!(f, "{} (after {}s)", self.to, d.as_secs()),
            None => f.write_str(&self.to),
        }
    }
}
