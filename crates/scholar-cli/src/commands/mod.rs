//! CLI command implementations
//!
//! Each subcommand group has its own module. Commands share an
//! [`AppContext`] holding the configuration, the stored session and the
//! API client built from both.

pub mod application;
pub mod auth;
pub mod config;
pub mod documents;
pub mod interview;
pub mod notifications;
pub mod scholarship;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::session::{Session, SessionHandle};
use scholar_common::types::{ApplicationId, Capability, Role};
use tracing::warn;

/// Everything a command needs to talk to the backend
pub struct AppContext {
    pub config: Config,
    pub session: SessionHandle,
    pub client: ApiClient,
}

impl AppContext {
    /// Load the stored session and build a client for it
    pub fn new(config: Config) -> Result<Self> {
        let session = SessionHandle::new(Session::load(config.session_file())?);
        let client = ApiClient::from_config(&config, session.clone())?;

        Ok(Self {
            config,
            session,
            client,
        })
    }

    /// Role of the signed-in user, if it grants `capability`
    pub fn require(&self, capability: Capability) -> Result<Role> {
        self.session.lock().require(capability)
    }

    /// The application to act on: the `--application` flag, else the one
    /// remembered by `scholar apply`
    pub fn active_application(&self, explicit: Option<&str>) -> Result<ApplicationId> {
        if let Some(id) = explicit {
            return Ok(ApplicationId::new(id));
        }
        self.session
            .lock()
            .active_application
            .as_ref()
            .map(|active| active.application_id.clone())
            .ok_or(CliError::NoActiveApplication)
    }

    /// Record the page the command is acting on
    pub fn navigate(&self, path: impl Into<String>) {
        self.session.lock().navigate(path);
    }

    pub fn save_session(&self) -> Result<()> {
        self.session.lock().save()
    }

    /// Save the session on a path that is already failing; a write error
    /// is logged so the original error is what gets reported
    pub fn persist_session(&self) {
        if let Err(err) = self.save_session() {
            warn!(error = %err, "Failed to persist session");
        }
    }
}
