//! `scholar config` command implementation

use crate::config::Config;
use crate::error::Result;
use colored::Colorize;

/// Show the effective configuration
pub async fn show(config: &Config) -> Result<()> {
    println!("{}", "Scholar CLI Configuration:".cyan().bold());
    println!();
    println!("{:<24} {}", "server_url:", config.server_url());
    println!("{:<24} {}", "config_dir:", config.config_dir.display());
    println!("{:<24} {}", "session_file:", config.session_file().display());
    println!("{:<24} {}", "api_timeout_secs:", config.api_timeout_secs);
    println!("{:<24} {}", "notification_poll_secs:", config.notification_poll_secs);
    println!("{:<24} {}", "autosave_secs:", config.autosave_secs);
    println!("{:<24} {}", "verbose:", config.is_verbose());
    println!();
    println!("{}", "Sources (later wins):".cyan());
    println!("  {}", config.config_file().display());
    println!("  SCHOLAR_SERVER_URL, SCHOLAR_CONFIG_DIR, SCHOLAR_API_TIMEOUT_SECS,");
    println!("  SCHOLAR_NOTIFICATION_POLL_SECS, SCHOLAR_AUTOSAVE_SECS");
    println!("  --server-url, --verbose");

    Ok(())
}
