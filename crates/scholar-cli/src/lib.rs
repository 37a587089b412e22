//! Scholar CLI Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Student-side client for the scholarship portal.
//!
//! # Overview
//!
//! - **Session**: sign in, stored credentials and role checks (`scholar login`)
//! - **Wizard**: step-by-step application with validation before every save
//!   (`scholar apply`, `scholar section save`, `scholar draft save`)
//! - **Documents**: typed uploads with size and extension checks
//!   (`scholar documents upload`)
//! - **Review**: read-only summary and the submission gate
//!   (`scholar review`, `scholar submit`)
//! - **Interviews and notifications**: thin clients over the backend
//!   (`scholar interview`, `scholar notifications`)

pub mod api;
pub mod commands;
pub mod config;
pub mod documents;
pub mod error;
pub mod interview;
pub mod notifications;
pub mod progress;
pub mod review;
pub mod session;
pub mod wizard;

// Re-export commonly used types
pub use api::ApiClient;
pub use config::Config;
pub use error::{CliError, Result};
pub use session::{Session, SessionHandle};
pub use wizard::WizardController;

use clap::{Parser, Subcommand};

/// Scholar - scholarship application client
#[derive(Parser, Debug)]
#[command(name = "scholar")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Server URL (overrides config file)
    #[arg(long, env = "SCHOLAR_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// Application to work on instead of the active one
    #[arg(long, env = "SCHOLAR_APPLICATION_ID", global = true)]
    pub application: Option<String>,

    /// Print the full command reference as markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in to the portal
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "SCHOLAR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget stored credentials
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Browse scholarships
    Scholarship {
        #[command(subcommand)]
        command: ScholarshipCommand,
    },

    /// Start or resume an application for a scholarship
    Apply {
        /// Scholarship id
        scholarship_id: String,
    },

    /// Show progress of the active application
    Status,

    /// Fill in wizard sections
    Section {
        #[command(subcommand)]
        command: SectionCommand,
    },

    /// Save unfinished sections without validation
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },

    /// Manage supporting documents
    Documents {
        #[command(subcommand)]
        command: DocumentsCommand,
    },

    /// Show everything entered so far and what blocks submission
    Review,

    /// Submit the active application
    Submit {
        /// Confirm the information provided is accurate
        #[arg(long)]
        confirm_accurate: bool,

        /// Accept the scholarship terms and conditions
        #[arg(long)]
        accept_terms: bool,
    },

    /// Interview booking
    Interview {
        #[command(subcommand)]
        command: InterviewCommand,
    },

    /// Portal notifications
    Notifications {
        #[command(subcommand)]
        command: NotificationsCommand,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Scholarship subcommands
#[derive(Subcommand, Debug)]
pub enum ScholarshipCommand {
    /// Show scholarship details and required documents
    Show {
        /// Scholarship id
        id: String,
    },
}

/// Section subcommands
#[derive(Subcommand, Debug)]
pub enum SectionCommand {
    /// Validate and save one section from a YAML or JSON file
    Save {
        /// Step number (1-6) or name (e.g. "financial")
        step: String,

        /// Section data file
        file: String,

        /// Stay on this step after saving
        #[arg(long)]
        no_advance: bool,
    },
}

/// Draft subcommands
#[derive(Subcommand, Debug)]
pub enum DraftCommand {
    /// Store sections as-is, e.g. "financial=financial.yml"
    Save {
        /// STEP=FILE pairs
        #[arg(required = true)]
        sections: Vec<String>,
    },
}

/// Document subcommands
#[derive(Subcommand, Debug)]
pub enum DocumentsCommand {
    /// Show upload state of every document type
    List,

    /// Upload files, e.g. "transcript=grades.pdf"
    Upload {
        /// TYPE=PATH pairs
        #[arg(required = true)]
        files: Vec<String>,
    },
}

/// Interview subcommands
#[derive(Subcommand, Debug)]
pub enum InterviewCommand {
    /// List open interview slots
    Slots {
        /// Scholarship id (defaults to the active application's)
        #[arg(short, long)]
        scholarship: Option<String>,
    },

    /// Book an interview slot
    Book {
        /// Slot id
        slot_id: String,
    },

    /// List your bookings
    List,
}

/// Notification subcommands
#[derive(Subcommand, Debug)]
pub enum NotificationsCommand {
    /// List notifications
    List {
        /// Only unread notifications
        #[arg(short, long)]
        unread: bool,
    },

    /// Mark one notification read
    Read {
        /// Notification id
        id: String,
    },

    /// Mark every notification read
    ReadAll,

    /// Delete a notification
    Delete {
        /// Notification id
        id: String,
    },

    /// Poll for new notifications until interrupted
    Watch {
        /// Poll interval in seconds (defaults to the configured interval)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show all configuration
    Show,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_section_save() {
        let cli = Cli::try_parse_from([
            "scholar",
            "--application",
            "17",
            "section",
            "save",
            "financial",
            "financial.yml",
            "--no-advance",
        ])
        .unwrap();

        assert_eq!(cli.application.as_deref(), Some("17"));
        match cli.command {
            Some(Commands::Section {
                command: SectionCommand::Save { step, file, no_advance },
            }) => {
                assert_eq!(step, "financial");
                assert_eq!(file, "financial.yml");
                assert!(no_advance);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
