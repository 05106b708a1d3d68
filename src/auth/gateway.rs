//! Translates user intents into API calls and session mutations.
//!
//! Every operation follows the same shape: validate locally, call the
//! API once, then either mutate the session store through the sequenced
//! write path or map the failure into an `AuthError`. 401s from
//! authenticated calls and profile 403s are handled here, centrally,
//! so no call site can forget the cleanup.

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::guard::{GateDecision, ProfileGate};
use crate::models::{
    LoginRequest, MessageResponse, OauthProvider, ProfileCompletion, RegisterRequest, Role,
    UserSummary, VerifyEmailRequest,
};
use crate::session::{PendingVerification, Session, SessionStore};

use super::error::AuthError;
use super::oauth::{OauthCallback, OauthFlow, OauthIntent};

/// Shortest password the registration form accepts.
const MIN_PASSWORD_LEN: usize = 6;

pub struct AuthGateway {
    api: ApiClient,
    store: SessionStore,
    config: Option<RwLock<Config>>,
}

impl AuthGateway {
    /// The store is injected, never global: tests hand in a store over a
    /// scratch directory and production hands in the real one.
    pub fn new(api: ApiClient, store: SessionStore) -> Self {
        Self {
            api,
            store,
            config: None,
        }
    }

    /// Attach the app config; each successful login then records the
    /// address in `last_email` so the shell can prefill the next form.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(RwLock::new(config));
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Client bound to the current session token, or `SessionExpired`
    /// when there is none to bind.
    async fn authed(&self) -> Result<ApiClient, AuthError> {
        match self.store.token().await {
            Some(token) => Ok(self.api.with_token(token)),
            None => Err(AuthError::SessionExpired),
        }
    }

    /// Central failure path for authenticated calls: 401 clears the
    /// session before surfacing `SessionExpired`; a 403 naming the
    /// profile becomes the setup redirect.
    async fn handle_authed_failure(&self, err: ApiError) -> AuthError {
        match err {
            ApiError::Unauthorized => {
                info!("API returned 401, clearing session");
                self.store.clear_session().await;
                AuthError::SessionExpired
            }
            ApiError::Forbidden(msg) if msg.to_lowercase().contains("profile") => {
                AuthError::ProfileIncomplete(msg)
            }
            other => AuthError::from_api(other),
        }
    }

    /// Record the address that just signed in. No-op without an attached
    /// config; a failed save is logged, never surfaced.
    async fn remember_email(&self, email: &str) {
        if let Some(config) = &self.config {
            let mut config = config.write().await;
            config.last_email = Some(email.to_string());
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save remembered login email");
            }
        }
    }

    // ========================================================================
    // Registration and verification
    // ========================================================================

    /// Create an account. On success the user is *not* logged in; a
    /// `PendingVerification` is recorded and the API's acknowledgement
    /// returned for display.
    pub async fn register(&self, data: RegisterRequest) -> Result<MessageResponse, AuthError> {
        let name = data.name.trim();
        let username = data.username.trim();
        if name.is_empty() || username.is_empty() || data.email.trim().is_empty() {
            return Err(AuthError::Validation("All fields are required".to_string()));
        }
        let email = normalize_email(&data.email);
        validate_email(&email)?;
        validate_password(&data.password)?;

        let request = RegisterRequest {
            name: name.to_string(),
            username: username.to_string(),
            email: email.clone(),
            password: data.password,
            role: data.role,
        };

        match self.api.register(&request).await {
            Ok(resp) => {
                info!(email = %email, role = %request.role, "Registered, awaiting verification");
                self.store
                    .set_pending(PendingVerification::new(email, request.role))
                    .await;
                Ok(resp)
            }
            Err(e) => {
                error!(error = %e, "Registration failed");
                Err(AuthError::from_api(e))
            }
        }
    }

    /// Redeem the emailed 2-factor code. Success clears the pending
    /// record but never creates a session; the user logs in afterwards.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<MessageResponse, AuthError> {
        let email = normalize_email(email);
        let code = code.trim();
        if email.is_empty() || code.is_empty() {
            return Err(AuthError::Validation(
                "Email and verification code are required".to_string(),
            ));
        }

        let request = VerifyEmailRequest {
            email: email.clone(),
            code: code.to_string(),
        };

        match self.api.verify_email(&request).await {
            Ok(resp) => {
                info!(email = %email, "Email verified");
                self.store.clear_pending().await;
                Ok(resp)
            }
            Err(e) => {
                error!(error = %e, "Email verification failed");
                Err(AuthError::from_api(e))
            }
        }
    }

    pub async fn resend_verification(&self, email: &str) -> Result<MessageResponse, AuthError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        self.api
            .resend_verification(&email)
            .await
            .map_err(AuthError::from_api)
    }

    // ========================================================================
    // Login and logout
    // ========================================================================

    /// Exchange credentials for a session. A rejection flagged
    /// "verification required" records a pending verification so the
    /// shell can offer the code screen instead of a dead end.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let seq = self.store.begin_request().await;
        let request = LoginRequest {
            email: email.clone(),
            password: password.to_string(),
        };

        match self.api.login(&request).await {
            Ok(resp) => {
                if !self.store.set_session_seq(seq, resp.token, resp.user).await {
                    warn!(email = %email, "Login response arrived after newer state, ignored");
                } else {
                    info!(email = %email, "Login successful");
                }
                self.store.clear_pending().await;
                self.remember_email(&email).await;
                Ok(self.store.snapshot().await)
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                let mapped = AuthError::from_api(e);
                if let AuthError::VerificationRequired { email: ref flagged } = mapped {
                    let address = flagged.clone().unwrap_or_else(|| email.clone());
                    let pending = match self.store.pending().await {
                        // Keep the role recorded at registration time.
                        Some(p) if p.email == address => p,
                        _ => PendingVerification::email_only(address),
                    };
                    self.store.set_pending(pending).await;
                }
                self.store.set_error(mapped.to_string()).await;
                Err(mapped)
            }
        }
    }

    /// Local-only: drop the session from memory and disk. No API call.
    pub async fn logout(&self) {
        info!("Logging out");
        self.store.clear_session().await;
    }

    // ========================================================================
    // Password reset
    // ========================================================================

    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, AuthError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        self.api
            .forgot_password(&email)
            .await
            .map_err(AuthError::from_api)
    }

    /// The reset token arrives by email, outside any session.
    pub async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<MessageResponse, AuthError> {
        if reset_token.trim().is_empty() {
            return Err(AuthError::Validation("Reset link is invalid".to_string()));
        }
        validate_password(new_password)?;
        self.api
            .reset_password(reset_token.trim(), new_password)
            .await
            .map_err(AuthError::from_api)
    }

    // ========================================================================
    // Authenticated calls
    // ========================================================================

    /// Re-fetch the current user and fold it into the session through
    /// the sequenced path, so a refresh racing a logout loses.
    pub async fn refresh_user(&self) -> Result<UserSummary, AuthError> {
        // Slot and token come from one locked read; taken separately, a
        // logout between them would be outranked by the response.
        let (seq, token) = match self.store.begin_authed_request().await {
            Some(slot) => slot,
            None => return Err(AuthError::SessionExpired),
        };
        let client = self.api.with_token(token.clone());

        match client.me().await {
            Ok(user) => {
                self.store.set_session_seq(seq, token, user.clone()).await;
                Ok(user)
            }
            Err(e) => Err(self.handle_authed_failure(e).await),
        }
    }

    pub async fn profile_completion(&self) -> Result<ProfileCompletion, AuthError> {
        let client = self.authed().await?;
        match client.profile_completion().await {
            Ok(c) => Ok(c),
            Err(e) => Err(self.handle_authed_failure(e).await),
        }
    }

    /// Run the profile gate for one navigation: fetch completion only
    /// when the gate applies, and remember where the user was headed
    /// when it redirects to setup.
    pub async fn gate_navigation(
        &self,
        gate: &ProfileGate,
        current_path: &str,
    ) -> Result<GateDecision, AuthError> {
        let session = self.store.snapshot().await;
        if !gate.applies(&session, current_path) {
            return Ok(GateDecision::Skip);
        }
        let completion = self.profile_completion().await?;
        let decision = gate.check(&session, current_path, &completion);
        if let GateDecision::Redirect(_) = decision {
            self.store.remember_return_url(current_path).await;
        }
        Ok(decision)
    }

    // ========================================================================
    // OAuth
    // ========================================================================

    /// First phase: the authorize URL for the shell to navigate to.
    pub fn oauth_begin(&self, provider: OauthProvider, role: Role, intent: OauthIntent) -> OauthFlow {
        OauthFlow::begin(self.api.base_url(), provider, role, intent)
    }

    /// Second phase: exchange a validated callback for a full session.
    pub async fn complete_oauth(&self, callback: &OauthCallback) -> Result<Session, AuthError> {
        let seq = self.store.begin_request().await;

        match self
            .api
            .oauth_user(callback.provider, &callback.token, &callback.user_id)
            .await
        {
            Ok(resp) => {
                let email = resp.user.email.clone();
                if self.store.set_session_seq(seq, resp.token, resp.user).await {
                    info!(provider = %callback.provider, "OAuth login successful");
                }
                self.store.clear_pending().await;
                self.remember_email(&email).await;
                Ok(self.store.snapshot().await)
            }
            Err(e) => {
                error!(provider = %callback.provider, error = %e, "OAuth exchange failed");
                // A 401 here means the callback token was bad, not that a
                // session expired; surface it as the API failure it is.
                match e {
                    ApiError::Unauthorized => Err(AuthError::Api(ApiError::Unauthorized)),
                    other => Err(AuthError::from_api(other)),
                }
            }
        }
    }
}

// ============================================================================
// Validation helpers
// ============================================================================

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AuthError::Validation(
            "Please enter a valid email address".to_string(),
        ))
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
