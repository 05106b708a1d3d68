//! Provider login handled in two phases, like the server half of any
//! OAuth dance but seen from the client:
//!
//! 1. **RedirectPending** - build the authorize URL and hand it to the
//!    shell to navigate to; nothing local changes.
//! 2. **CallbackReceived** - the provider bounced back with a query
//!    string; validate it fully before touching any state, then hold the
//!    parsed callback for the gateway to exchange.
//!
//! A callback missing `token` or `userId` never advances the phase.

use std::str::FromStr;

use crate::models::{OauthProvider, Role};

use super::error::AuthError;

/// Whether the user is logging in to an existing account or creating one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OauthIntent {
    Login,
    Signup,
}

/// Everything the provider redirect carried, validated.
#[derive(Debug, Clone)]
pub struct OauthCallback {
    pub provider: OauthProvider,
    pub token: String,
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone)]
pub enum OauthPhase {
    RedirectPending,
    CallbackReceived(OauthCallback),
}

/// One provider-login attempt from redirect to validated callback.
#[derive(Debug, Clone)]
pub struct OauthFlow {
    provider: OauthProvider,
    authorize_url: String,
    phase: OauthPhase,
}

impl OauthFlow {
    /// Start a flow. The authorize URL points at the API, which runs the
    /// actual provider handshake and redirects back with the result.
    pub fn begin(base_url: &str, provider: OauthProvider, role: Role, intent: OauthIntent) -> Self {
        let base = base_url.trim_end_matches('/');
        let mut authorize_url = format!("{}/auth/{}?role={}", base, provider.as_str(), role);
        if intent == OauthIntent::Signup {
            authorize_url.push_str("&signup=true");
        }
        Self {
            provider,
            authorize_url,
            phase: OauthPhase::RedirectPending,
        }
    }

    pub fn provider(&self) -> OauthProvider {
        self.provider
    }

    /// Where the shell should navigate the browser.
    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    pub fn phase(&self) -> &OauthPhase {
        &self.phase
    }

    /// Accept the provider's redirect query (`token=...&userId=...`).
    ///
    /// Validates before mutating: on a missing or empty `token`/`userId`
    /// the phase stays `RedirectPending` and the caller gets the error
    /// (whose redirect sends the user back to `/login` after a pause).
    pub fn receive_callback(&mut self, query: &str) -> Result<&OauthCallback, AuthError> {
        let params = parse_query(query);

        let token = match find(&params, "token") {
            Some(t) => t,
            None => return Err(AuthError::MissingData("token")),
        };
        let user_id = match find(&params, "userId") {
            Some(id) => id,
            None => return Err(AuthError::MissingData("userId")),
        };

        let callback = OauthCallback {
            provider: self.provider,
            token,
            user_id,
            email: find(&params, "email"),
            name: find(&params, "name"),
            role: find(&params, "role").and_then(|r| Role::from_str(&r).ok()),
        };
        self.phase = OauthPhase::CallbackReceived(callback);
        match &self.phase {
            OauthPhase::CallbackReceived(cb) => Ok(cb),
            OauthPhase::RedirectPending => unreachable!("phase was just set"),
        }
    }
}

fn find(params: &[(String, String)], key: &str) -> Option<String> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
        .filter(|v| !v.is_empty())
}

/// Split a query string into decoded key/value pairs. Accepts an
/// optional leading `?`; pairs without `=` parse as empty values.
fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((k, v)) => (percent_decode(k), percent_decode(v)),
            None => (percent_decode(part), String::new()),
        })
        .collect()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode percent escapes and `+` as space. Malformed escapes pass
/// through literally rather than failing the whole callback.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi * 16 + lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ============================================================================
// Tests
// ============================================================================
