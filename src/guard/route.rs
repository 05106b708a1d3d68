use crate::models::Role;
use crate::session::Session;

use super::Redirect;

/// Where an anonymous visitor is sent.
const LOGIN_PATH: &str = "/login";

/// Outcome of evaluating a guard against the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Rehydration has not finished; render a placeholder, never redirect.
    Loading,
    /// Not authenticated; send to the login page.
    Redirect(Redirect),
    /// Authenticated with the wrong role; show access denied in place.
    Denied { required: Role, actual: Role },
    /// Render the protected content.
    Allow,
}

/// Per-route access policy: authentication always, a specific role
/// optionally.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    required_role: Option<Role>,
    redirect_to: String,
}

impl RouteGuard {
    /// Guard that only requires a logged-in user.
    pub fn authenticated() -> Self {
        Self {
            required_role: None,
            redirect_to: LOGIN_PATH.to_string(),
        }
    }

    /// Guard that requires a logged-in user with the given role.
    pub fn with_role(role: Role) -> Self {
        Self {
            required_role: Some(role),
            redirect_to: LOGIN_PATH.to_string(),
        }
    }

    /// Send unauthenticated visitors somewhere other than `/login`.
    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect_to = path.into();
        self
    }

    /// Decide what to do with a navigation given the current session.
    ///
    /// Order matters: the loading check comes first so a slow rehydration
    /// never bounces a user who is about to be restored.
    pub fn evaluate(&self, session: &Session) -> RouteDecision {
        if session.loading {
            return RouteDecision::Loading;
        }
        if !session.authenticated {
            return RouteDecision::Redirect(Redirect::to(&self.redirect_to));
        }
        if let Some(required) = self.required_role {
            match session.role {
                Some(actual) if actual == required => {}
                Some(actual) => return RouteDecision::Denied { required, actual },
                // Authenticated sessions always carry a role; a snapshot
                // without one is treated as anonymous.
                None => return RouteDecision::Redirect(Redirect::to(&self.redirect_to)),
            }
        }
        RouteDecision::Allow
    }
}

// ============================================================================
// Tests
// ============================================================================
