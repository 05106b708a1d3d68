//! API client for the jobdeck REST API.
//!
//! This module provides the `ApiClient` struct with one typed method per
//! auth endpoint. Requests are sent exactly once; a failure surfaces to the
//! caller as an `ApiError` without any automatic retry.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{
    AuthResponse, EmailRequest, LoginRequest, MessageResponse, OauthProvider, ProfileCompletion,
    RegisterRequest, ResetPasswordRequest, UserSummary, VerifyEmailRequest,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 15s fails fast enough to keep auth forms responsive when the API is down.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// API client for the jobdeck backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given base URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self.client.request(method, self.url(path));
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Check if response is successful, returning a classified error if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response body: {}", e)))
    }

    // ========================================================================
    // Auth endpoints
    // ========================================================================

    /// `POST /auth/register` - create an account; the API answers with an
    /// acknowledgement, never a session.
    pub async fn register(&self, req: &RegisterRequest) -> Result<MessageResponse, ApiError> {
        debug!(email = %req.email, role = %req.role, "Registering account");
        let response = self
            .request(Method::POST, "/auth/register")
            .json(req)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// `POST /auth/login` - exchange credentials for a token and user.
    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        debug!(email = %req.email, "Logging in");
        let response = self
            .request(Method::POST, "/auth/login")
            .json(req)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// `POST /auth/verify-email` - redeem a 2-factor verification code.
    pub async fn verify_email(&self, req: &VerifyEmailRequest) -> Result<MessageResponse, ApiError> {
        debug!(email = %req.email, "Verifying email");
        let response = self
            .request(Method::POST, "/auth/verify-email")
            .json(req)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// `POST /auth/resend-verification`
    pub async fn resend_verification(&self, email: &str) -> Result<MessageResponse, ApiError> {
        debug!(email = %email, "Resending verification code");
        let response = self
            .request(Method::POST, "/auth/resend-verification")
            .json(&EmailRequest { email: email.to_string() })
            .send()
            .await?;
        Self::parse(response).await
    }

    /// `POST /auth/forgot-password`
    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, ApiError> {
        debug!(email = %email, "Requesting password reset");
        let response = self
            .request(Method::POST, "/auth/forgot-password")
            .json(&EmailRequest { email: email.to_string() })
            .send()
            .await?;
        Self::parse(response).await
    }

    /// `PUT /auth/reset-password/{token}` - the token arrives out of band
    /// in the reset email, not from the session.
    pub async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<MessageResponse, ApiError> {
        debug!("Resetting password");
        let path = format!("/auth/reset-password/{}", reset_token);
        let response = self
            .request(Method::PUT, &path)
            .json(&ResetPasswordRequest { password: new_password.to_string() })
            .send()
            .await?;
        Self::parse(response).await
    }

    /// `GET /auth/me` - fetch the current user for the bearer token.
    pub async fn me(&self) -> Result<UserSummary, ApiError> {
        debug!("Fetching current user");
        let response = self.request(Method::GET, "/auth/me").send().await?;
        Self::parse(response).await
    }

    /// `GET /auth/{provider}/user` - second half of the OAuth handshake.
    /// The callback token rides as the bearer header and the userId as a
    /// query param for the server to cross-check.
    pub async fn oauth_user(
        &self,
        provider: OauthProvider,
        token: &str,
        user_id: &str,
    ) -> Result<AuthResponse, ApiError> {
        debug!(provider = %provider, "Exchanging OAuth callback for session");
        let path = format!("/auth/{}/user", provider.as_str());
        let response = self
            .client
            .get(self.url(&path))
            .bearer_auth(token)
            .query(&[("userId", user_id)])
            .send()
            .await?;
        Self::parse(response).await
    }

    /// `GET /profile/completion` - how far along the account's profile is.
    pub async fn profile_completion(&self) -> Result<ProfileCompletion, ApiError> {
        debug!("Fetching profile completion");
        let response = self.request(Method::GET, "/profile/completion").send().await?;
        Self::parse(response).await
    }
}

// ============================================================================
// Tests
// ============================================================================
