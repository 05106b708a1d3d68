use thiserror::Error;

use crate::models::ApiErrorBody;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Unauthorized - token missing or expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Email verification required")]
    VerificationRequired { email: Option<String> },

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data.
    /// Backs the cut up to a char boundary; slicing mid-character panics.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)",
                    &body[..end],
                    body.len())
        }
    }

    /// Classify a non-2xx response from its status and JSON error body.
    ///
    /// The `verificationRequired` flag wins over the status code: the API
    /// sends it with a 401/403 login rejection, and treating that as a
    /// plain auth failure would lose the resend-code path.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
        if parsed.verification_required {
            return ApiError::VerificationRequired { email: parsed.email };
        }
        let message = parsed
            .message
            .unwrap_or_else(|| Self::truncate_body(body));
        match status.as_u16() {
            400 | 422 => ApiError::Validation(message),
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_maps_auth_statuses() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, r#"{"message":"Email already in use"}"#),
            ApiError::Conflict(m) if m == "Email already in use"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, r#"{"message":"bad email"}"#),
            ApiError::Validation(m) if m == "bad email"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "oops"),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_verification_flag_beats_status_code() {
        let body = r#"{"message":"Please verify your email",
                       "verificationRequired":true,
                       "email":"jane@x.com"}"#;
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, body);
        assert!(matches!(
            err,
            ApiError::VerificationRequired { email: Some(e) } if e == "jane@x.com"
        ));
    }

    #[test]
    fn test_plain_text_body_is_kept_verbatim() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, "plain failure");
        assert!(matches!(err, ApiError::Forbidden(m) if m == "plain failure"));
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let text = err.to_string();
        assert!(text.len() < 700);
        assert!(text.contains("truncated"));
    }

    #[test]
    fn test_truncation_backs_up_to_a_char_boundary() {
        // A multibyte character straddles the cut point.
        let body = format!("{}身body", "x".repeat(499));
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, &body);
        let text = err.to_string();
        assert!(text.contains("truncated"));
        assert!(!text.contains('身'));
    }
}
