//! Session identity and role types.

use serde::{Deserialize, Serialize};

/// Dashboard role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Clinician,
}

impl Role {
    /// Login page a session with the wrong role is redirected to.
    #[must_use]
    pub fn login_page(&self) -> LoginPage {
        match self {
            Self::Patient => LoginPage::Patient,
            Self::Clinician => LoginPage::Clinician,
        }
    }

    /// Endpoint that establishes a session for this role.
    #[must_use]
    pub fn login_endpoint(&self) -> &'static str {
        match self {
            Self::Patient => "/patient-login",
            Self::Clinician => "/clinician-login",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Clinician => "clinician",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Patient => write!(f, "Patient"),
            Self::Clinician => write!(f, "Clinician"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Self::Patient),
            "clinician" => Ok(Self::Clinician),
            other => Err(format!("unknown role '{other}' (expected patient or clinician)")),
        }
    }
}

/// Redirect target when the session guard refuses a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPage {
    Patient,
    Clinician,
}

impl LoginPage {
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Patient => "/login.html",
            Self::Clinician => "/clinician_login.html",
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Patient => Role::Patient,
            Self::Clinician => Role::Clinician,
        }
    }
}

/// Response of `GET /whoami`.
///
/// Every field may be null for an anonymous session. Unknown role strings
/// are treated as no role at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<Role>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub user_id: Option<i64>,

    #[serde(default)]
    pub clinician_id: Option<i64>,
}

impl Identity {
    /// Whether the session holds the expected role.
    #[must_use]
    pub fn has_role(&self, expected: Role) -> bool {
        self.role == Some(expected)
    }

    /// Name shown in the dashboard header.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.name.as_deref(), self.user_id.or(self.clinician_id)) {
            (Some(name), _) if !name.trim().is_empty() => name.trim().to_string(),
            (_, Some(id)) => format!("#{id}"),
            _ => "Unknown".to_string(),
        }
    }
}

fn lenient_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}
