use serde::{Deserialize, Serialize};

/// Account role as issued by the API.
///
/// The API sends roles as lowercase strings ("candidate", "employer",
/// "admin") in both the user object and the `userRole` session field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Employer,
    Admin,
}

impl Role {
    /// Admins bypass the profile-completion gate and role checks
    /// that name them directly.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "candidate" => Ok(Role::Candidate),
            "employer" => Ok(Role::Employer),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    #[serde(rename = "isEmailVerified", default)]
    pub is_email_verified: bool,
    /// Role-specific profile document; opaque to the session layer.
    #[serde(default)]
    pub profile: Option<serde_json::Value>,
}

impl UserSummary {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.email)
    }
}

/// Response from the profile-completion endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProfileCompletion {
    #[serde(rename = "hasProfile")]
    pub has_profile: bool,
    #[serde(rename = "completionPercentage")]
    pub completion_percentage: u8,
    #[serde(rename = "isProfileComplete")]
    pub is_profile_complete: bool,
}

impl ProfileCompletion {
    /// True when the account should be steered to the setup page.
    /// A missing profile counts as incomplete.
    pub fn needs_completion(&self) -> bool {
        !self.has_profile || !self.is_profile_complete
    }
}

// ============================================================================
// Tests
// ============================================================================
