//! Stored login and navigation state
//!
//! A [`Session`] is loaded once at startup, shared with the API client
//! through a [`SessionHandle`], and cleared on logout or when the backend
//! answers 401.

use crate::error::{CliError, Result};
use scholar_common::types::{ApplicationId, Capability, Role, ScholarshipId, UserId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Where a 401 sends the user
pub const EXPIRED_REDIRECT: &str = "/login?expired=1";

const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/login",
    "/register",
    "/forgot-password",
    "/reset-password",
    "/scholarships",
];

/// Pages that stay reachable without a login
pub fn is_public_path(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    PUBLIC_PATHS.contains(&path) || path.starts_with("/scholarships/")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
}

/// The application the `section`, `documents` and `submit` commands act on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveApplication {
    pub application_id: ApplicationId,
    pub scholarship_id: ScholarshipId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<SessionUser>,
    #[serde(default)]
    pub active_application: Option<ActiveApplication>,
    /// Page the user is on; decides whether a 401 redirects
    #[serde(default = "default_path")]
    pub current_path: String,
    #[serde(skip)]
    path: Option<PathBuf>,
}

fn default_path() -> String {
    "/".to_string()
}

impl Default for Session {
    fn default() -> Self {
        Self {
            token: None,
            user: None,
            active_application: None,
            current_path: default_path(),
            path: None,
        }
    }
}

impl Session {
    /// In-memory session that is never written to disk
    pub fn ephemeral() -> Self {
        Self::default()
    }

    /// Read the session file, or start empty when there is none
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut session = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str::<Session>(&content)?
        } else {
            Session::default()
        };
        session.path = Some(path);
        Ok(session)
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the session file; a no-op for ephemeral sessions
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "Session saved");
        Ok(())
    }

    /// Forget everything and remove the session file
    pub fn clear(&mut self) -> Result<()> {
        let path = self.path.take();
        *self = Session::default();
        if let Some(path) = path {
            if path.exists() {
                std::fs::remove_file(&path)?;
            }
            self.path = Some(path);
        }
        Ok(())
    }

    pub fn sign_in(&mut self, token: String, user: SessionUser) {
        info!(user_id = %user.id, role = %user.role, "Signed in");
        self.token = Some(token);
        self.current_path = user.role.home_path().to_string();
        self.user = Some(user);
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    /// The role of the signed-in user, if it grants `capability`
    pub fn require(&self, capability: Capability) -> Result<Role> {
        let role = match (&self.token, self.role()) {
            (Some(_), Some(role)) => role,
            _ => return Err(CliError::NotLoggedIn),
        };
        if role.allows(capability) {
            Ok(role)
        } else {
            Err(CliError::forbidden(format!(
                "a {} account cannot {}",
                role,
                describe(capability)
            )))
        }
    }

    pub fn navigate(&mut self, path: impl Into<String>) {
        self.current_path = path.into();
    }

    pub fn set_active_application(&mut self, active: ActiveApplication) {
        self.active_application = Some(active);
    }

    /// Drop credentials after a 401
    ///
    /// Returns the redirect target unless the current page is public. The
    /// active application is kept so the user can pick up after logging in.
    pub fn expire(&mut self) -> Option<String> {
        self.token = None;
        self.user = None;

        if is_public_path(&self.current_path) {
            None
        } else {
            self.current_path = EXPIRED_REDIRECT.to_string();
            Some(EXPIRED_REDIRECT.to_string())
        }
    }
}

fn describe(capability: Capability) -> &'static str {
    match capability {
        Capability::ApplyForScholarship => "apply for scholarships",
        Capability::BookInterview => "book interviews",
        Capability::ReviewApplications => "review applications",
        Capability::ScheduleInterviews => "schedule interviews",
        Capability::ConductInterviews => "conduct interviews",
        Capability::ManageScholarships => "manage scholarships",
        Capability::ManageUsers => "manage users",
        Capability::ReceiveNotifications => "receive notifications",
    }
}

/// Session shared between the API client and the command layer
#[derive(Debug, Clone, Default)]
pub struct SessionHandle(Arc<Mutex<Session>>);

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    /// A poisoned lock still holds a usable session
    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    /// Expire the session and persist the result
    pub fn expire(&self) -> Option<String> {
        let mut session = self.lock();
        let redirect = session.expire();
        if let Err(err) = session.save() {
            tracing::warn!(error = %err, "Failed to persist expired session");
        }
        redirect
    }
}
