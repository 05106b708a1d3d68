use serde::{Deserialize, Serialize};

use super::user::{Role, UserSummary};

/// External login providers the API brokers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OauthProvider {
    Google,
    Facebook,
}

impl OauthProvider {
    /// Path segment under `/auth/` for this provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            OauthProvider::Google => "google",
            OauthProvider::Facebook => "facebook",
        }
    }
}

impl std::fmt::Display for OauthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Request bodies

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

// Response payloads

/// `POST /auth/login` and `GET /auth/{provider}/user` both answer with the
/// issued token plus the full user object.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Plain acknowledgement used by register, verify, resend, forgot and reset.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body the API attaches to non-2xx auth responses.
///
/// `verificationRequired` rides on a login rejection for an unverified
/// account; `email` echoes which address still needs the code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "verificationRequired", default)]
    pub verification_required: bool,
    #[serde(default)]
    pub email: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
