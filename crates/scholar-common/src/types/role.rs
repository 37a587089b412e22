//! User roles and the capabilities they grant
//!
//! Every permission decision in the client goes through [`Role::allows`].
//! The backend encodes the role either as a bare string (`"student"`) or as
//! an object (`{"role_name": "student"}`); both are accepted.

use crate::error::PortalError;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Officer,
    Interviewer,
    Admin,
}

/// An action gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ApplyForScholarship,
    BookInterview,
    ReviewApplications,
    ScheduleInterviews,
    ConductInterviews,
    ManageScholarships,
    ManageUsers,
    ReceiveNotifications,
}

impl Role {
    pub fn allows(self, capability: Capability) -> bool {
        use Capability::*;

        match self {
            Role::Student => matches!(
                capability,
                ApplyForScholarship | BookInterview | ReceiveNotifications
            ),
            Role::Officer => matches!(
                capability,
                ReviewApplications | ScheduleInterviews | ReceiveNotifications
            ),
            Role::Interviewer => matches!(capability, ConductInterviews | ReceiveNotifications),
            Role::Admin => !matches!(capability, ApplyForScholarship | BookInterview),
        }
    }

    /// Landing page after login
    pub fn home_path(self) -> &'static str {
        match self {
            Role::Student => "/student/dashboard",
            Role::Officer => "/officer/dashboard",
            Role::Interviewer => "/interviewer/dashboard",
            Role::Admin => "/admin/dashboard",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Officer => "officer",
            Role::Interviewer => "interviewer",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" | "applicant" => Ok(Role::Student),
            "officer" | "scholarship_officer" | "staff" => Ok(Role::Officer),
            "interviewer" => Ok(Role::Interviewer),
            "admin" | "administrator" | "super_admin" => Ok(Role::Admin),
            _ => Err(PortalError::UnknownRole(s.to_string())),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRole {
    Name(String),
    Object { role_name: String },
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = match RawRole::deserialize(deserializer)? {
            RawRole::Name(name) => name,
            RawRole::Object { role_name } => role_name,
        };
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_accepts_both_encodings() {
        let plain: Role = serde_json::from_str("\"student\"").unwrap();
        let object: Role = serde_json::from_str(r#"{"role_name": "Student"}"#).unwrap();
        assert_eq!(plain, Role::Student);
        assert_eq!(object, Role::Student);

        let officer: Role = serde_json::from_str(r#"{"role_name": "scholarship_officer"}"#).unwrap();
        assert_eq!(officer, Role::Officer);

        assert!(serde_json::from_str::<Role>("\"janitor\"").is_err());
    }

    #[test]
    fn test_capabilities() {
        assert!(Role::Student.allows(Capability::ApplyForScholarship));
        assert!(!Role::Student.allows(Capability::ReviewApplications));
        assert!(Role::Officer.allows(Capability::ReviewApplications));
        assert!(!Role::Officer.allows(Capability::ApplyForScholarship));
        assert!(Role::Interviewer.allows(Capability::ConductInterviews));
        assert!(Role::Admin.allows(Capability::ManageScholarships));
        assert!(!Role::Admin.allows(Capability::BookInterview));

        for role in [Role::Student, Role::Officer, Role::Interviewer, Role::Admin] {
            assert!(role.allows(Capability::ReceiveNotifications));
        }
    }

    #[test]
    fn test_home_path() {
        assert_eq!(Role::Student.home_path(), "/student/dashboard");
        assert_eq!(Role::Admin.home_path(), "/admin/dashboard");
    }
}
