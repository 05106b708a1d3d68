use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Role, UserSummary};

/// Days a persisted session stays usable without a fresh login.
/// Matches the 7-day lifetime of the tokens the API issues.
const RECORD_TTL_DAYS: i64 = 7;

/// Durable snapshot of an authenticated session, written on login and
/// read back at startup. One record on disk is the single source of
/// truth; there is no secondary mirror to fall out of sync with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub user: UserSummary,
    pub role: Role,
    pub saved_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(token: String, user: UserSummary) -> Self {
        let role = user.role;
        Self {
            token,
            user,
            role,
            saved_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        let expiry = self.saved_at + Duration::days(RECORD_TTL_DAYS);
        Utc::now() > expiry
    }

    pub fn time_until_expiry(&self) -> Duration {
        let expiry = self.saved_at + Duration::days(RECORD_TTL_DAYS);
        expiry - Utc::now()
    }

    /// Days remaining until expiry (for display)
    pub fn days_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_days().max(0)
    }
}

/// State recorded between registration and email verification.
/// Survives restarts so the verify screen can be re-offered.
///
/// The role is known when registration happened here; a login blocked on
/// verification only reveals the email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingVerification {
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl PendingVerification {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role: Some(role),
        }
    }

    pub fn email_only(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserSummary {
        UserSummary {
            id: "u1".to_string(),
            name: Some("Jane".to_string()),
            email: "jane@x.com".to_string(),
            role: Role::Candidate,
            is_email_verified: true,
            profile: None,
        }
    }

    #[test]
    fn test_fresh_record_is_not_expired() {
        let record = SessionRecord::new("jwt-abc".to_string(), sample_user());
        assert!(!record.is_expired());
        assert_eq!(record.role, Role::Candidate);
        assert!(record.days_until_expiry() >= 6);
    }

    #[test]
    fn test_record_expires_after_seven_days() {
        let mut record = SessionRecord::new("jwt-abc".to_string(), sample_user());
        record.saved_at = Utc::now() - Duration::days(8);
        assert!(record.is_expired());
        assert_eq!(record.days_until_expiry(), 0);
    }

    #[test]
    fn test_record_survives_serde_round_trip() {
        let record = SessionRecord::new("jwt-abc".to_string(), sample_user());
        let json = serde_json::to_string(&record).unwrap();
        let back: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.token, "jwt-abc");
        assert_eq!(back.user.email, "jane@x.com");
    }

    #[test]
    fn test_pending_verification_equality() {
        let a = PendingVerification::new("jane@x.com", Role::Candidate);
        let b = PendingVerification::new("jane@x.com", Role::Candidate);
        assert_eq!(a, b);
        assert_ne!(a, PendingVerification::email_only("jane@x.com"));
    }

    #[test]
    fn test_pending_tolerates_missing_role() {
        let p: PendingVerification = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert_eq!(p.role, None);
        assert_eq!(p.email, "a@b.co");
    }
}
