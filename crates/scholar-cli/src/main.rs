//! Scholar CLI - Main entry point

use clap::Parser;
use scholar_cli::commands::{self, AppContext};
use scholar_cli::{
    Cli, Commands, Config, ConfigCommand, DocumentsCommand, DraftCommand, InterviewCommand,
    NotificationsCommand, ScholarshipCommand, SectionCommand,
};
use scholar_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Values from a .env file act like real environment variables
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    let Some(command) = &cli.command else {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    };

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Console)
        .log_file_prefix("scholar".to_string())
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().with_env().unwrap_or(log_config);

    // The CLI works without logging
    let _guard = init_logging(&log_config).ok().flatten();

    if let Err(e) = execute_command(&cli, command).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        if let scholar_cli::CliError::SessionExpired {
            redirect: Some(redirect),
        } = &e
        {
            eprintln!("Redirecting to {}", redirect);
        }
        process::exit(1);
    }
}

async fn execute_command(cli: &Cli, command: &Commands) -> scholar_cli::Result<()> {
    let mut config = Config::load()?;
    if let Some(url) = &cli.server_url {
        config.set_server_url(url.clone());
    }
    if cli.verbose {
        config.set_verbose(true);
    }

    if let Commands::Config { command } = command {
        return match command {
            ConfigCommand::Show => commands::config::show(&config).await,
        };
    }

    let ctx = AppContext::new(config)?;
    let application = cli.application.as_deref();

    match command {
        Commands::Login { email, password } => {
            commands::auth::login(&ctx, email, password.clone()).await
        }
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Whoami => commands::auth::whoami(&ctx).await,

        Commands::Scholarship { command } => match command {
            ScholarshipCommand::Show { id } => commands::scholarship::show(&ctx, id).await,
        },

        Commands::Apply { scholarship_id } => {
            commands::application::apply(&ctx, scholarship_id).await
        }
        Commands::Status => commands::application::status(&ctx, application).await,

        Commands::Section { command } => match command {
            SectionCommand::Save {
                step,
                file,
                no_advance,
            } => {
                commands::application::save_section(&ctx, application, step, file, *no_advance)
                    .await
            }
        },

        Commands::Draft { command } => match command {
            DraftCommand::Save { sections } => {
                commands::application::save_draft(&ctx, application, sections).await
            }
        },

        Commands::Documents { command } => match command {
            DocumentsCommand::List => commands::documents::list(&ctx, application).await,
            DocumentsCommand::Upload { files } => {
                commands::documents::upload(&ctx, application, files).await
            }
        },

        Commands::Review => commands::application::review(&ctx, application).await,

        Commands::Submit {
            confirm_accurate,
            accept_terms,
        } => {
            commands::application::submit(&ctx, application, *confirm_accurate, *accept_terms)
                .await
        }

        Commands::Interview { command } => match command {
            InterviewCommand::Slots { scholarship } => {
                commands::interview::slots(&ctx, scholarship.as_deref()).await
            }
            InterviewCommand::Book { slot_id } => commands::interview::book(&ctx, slot_id).await,
            InterviewCommand::List => commands::interview::list(&ctx).await,
        },

        Commands::Notifications { command } => match command {
            NotificationsCommand::List { unread } => {
                commands::notifications::list(&ctx, *unread).await
            }
            NotificationsCommand::Read { id } => commands::notifications::read(&ctx, id).await,
            NotificationsCommand::ReadAll => commands::notifications::read_all(&ctx).await,
            NotificationsCommand::Delete { id } => {
                commands::notifications::delete(&ctx, id).await
            }
            NotificationsCommand::Watch { interval } => {
                commands::notifications::watch(&ctx, *interval).await
            }
        },

        Commands::Config { .. } => Ok(()),
    }
}
