use std::time::Duration;

use thiserror::Error;

use crate::api::ApiError;
use crate::guard::Redirect;

/// Seconds an OAuth-failure notice stays on screen before the callback
/// page bounces back to `/login`.
const OAUTH_FAILURE_REDIRECT_DELAY_SECS: u64 = 3;

/// Flow-level auth failures. `Display` text is what the user sees in a
/// notification; the variant is what the shell branches on.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Please verify your email before logging in")]
    VerificationRequired { email: Option<String> },

    #[error("Your session has expired - please log in again")]
    SessionExpired,

    #[error("{0}")]
    ProfileIncomplete(String),

    #[error("Login provider did not return a {0}")]
    MissingData(&'static str),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Api(#[source] ApiError),
}

impl AuthError {
    /// Map an API failure from an unauthenticated flow. Authenticated
    /// flows go through the gateway's cleanup path instead, which turns
    /// 401 into `SessionExpired` and profile 403s into `ProfileIncomplete`.
    pub(crate) fn from_api(err: ApiError) -> Self {
        match err {
            ApiError::Validation(m) => AuthError::Validation(m),
            ApiError::Conflict(m) => AuthError::Conflict(m),
            ApiError::VerificationRequired { email } => AuthError::VerificationRequired { email },
            ApiError::Unauthorized => AuthError::InvalidCredentials,
            ApiError::Network(e) => AuthError::Network(e.to_string()),
            other => AuthError::Api(other),
        }
    }

    /// The forced navigation this failure demands, if any. Centralized
    /// so call sites cannot disagree about where an expired session or
    /// a broken OAuth callback lands.
    pub fn redirect(&self) -> Option<Redirect> {
        match self {
            AuthError::SessionExpired => Some(Redirect::to("/login?session_expired=true")),
            AuthError::ProfileIncomplete(_) => Some(Redirect::to("/setup")),
            AuthError::MissingData(_) => Some(Redirect::delayed(
                "/login",
                Duration::from_secs(OAUTH_FAILURE_REDIRECT_DELAY_SECS),
            )),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expired_redirects_to_login_with_flag() {
        let redirect = AuthError::SessionExpired.redirect().unwrap();
        assert_eq!(redirect.to, "/login?session_expired=true");
        assert!(redirect.delay.is_none());
    }

    #[test]
    fn test_profile_incomplete_redirects_to_setup() {
        let redirect = AuthError::ProfileIncomplete("Complete your profile".into())
            .redirect()
            .unwrap();
        assert_eq!(redirect.to, "/setup");
    }

    #[test]
    fn test_missing_data_redirects_after_delay() {
        let redirect = AuthError::MissingData("token").redirect().unwrap();
        assert_eq!(redirect.to, "/login");
        assert_eq!(redirect.delay, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_plain_failures_do_not_redirect() {
        assert!(AuthError::InvalidCredentials.redirect().is_none());
        assert!(AuthError::Validation("Email is required".into()).redirect().is_none());
        assert!(AuthError::Conflict("Email already in use".into()).redirect().is_none());
    }

    #[test]
    fn test_from_api_maps_unauthorized_to_bad_credentials() {
        let err = AuthError::from_api(ApiError::Unauthorized);
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_from_api_keeps_verification_email() {
        let err = AuthError::from_api(ApiError::VerificationRequired {
            email: Some("jane@x.com".into()),
        });
        assert!(matches!(
            err,
            AuthError::VerificationRequired { email: Some(e) } if e == "jane@x.com"
        ));
    }

    #[test]
    fn test_missing_data_message_names_the_field() {
        let msg = AuthError::MissingData("userId").to_string();
        assert!(msg.contains("userId"));
    }
}
