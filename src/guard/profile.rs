use crate::models::ProfileCompletion;
use crate::session::Session;

use super::Redirect;

/// Where incomplete profiles are sent.
pub const SETUP_PATH: &str = "/setup";

/// Paths the gate never fires on. `/setup` itself must be exempt or the
/// redirect would loop; the auth pages are exempt because anonymous
/// visitors own them.
const EXEMPT_PATHS: &[&str] = &["/setup", "/login", "/register"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Gate does not apply here (anonymous, admin, or exempt path).
    Skip,
    /// Profile is complete; proceed.
    Allow,
    /// Profile needs work; go set it up.
    Redirect(Redirect),
}

/// Steers authenticated non-admin users with unfinished profiles to the
/// setup page. Decisions are pure; fetching completion data and storing
/// the return URL happen in the gateway.
#[derive(Debug, Clone)]
pub struct ProfileGate {
    exempt_paths: Vec<String>,
}

impl Default for ProfileGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileGate {
    pub fn new() -> Self {
        Self {
            exempt_paths: EXEMPT_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Exempt an additional path (exact match on the path component).
    pub fn exempt(mut self, path: impl Into<String>) -> Self {
        self.exempt_paths.push(path.into());
        self
    }

    fn is_exempt(&self, current_path: &str) -> bool {
        let path = current_path.split('?').next().unwrap_or(current_path);
        self.exempt_paths.iter().any(|p| p == path)
    }

    /// Whether this navigation needs a completion check at all.
    /// False means `Skip` without fetching anything.
    pub fn applies(&self, session: &Session, current_path: &str) -> bool {
        if self.is_exempt(current_path) || session.loading || !session.authenticated {
            return false;
        }
        // Admins have no profile to complete.
        !session.role.map(|r| r.is_admin()).unwrap_or(false)
    }

    /// Decide the navigation given fetched completion data.
    pub fn check(
        &self,
        session: &Session,
        current_path: &str,
        completion: &ProfileCompletion,
    ) -> GateDecision {
        if !self.applies(session, current_path) {
            return GateDecision::Skip;
        }
        if completion.needs_completion() {
            GateDecision::Redirect(Redirect::to(SETUP_PATH))
        } else {
            GateDecision::Allow
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
