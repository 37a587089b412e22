//! Application wizard commands
//!
//! `scholar apply`, `status`, `section save`, `draft save`, `review` and
//! `submit` all act on one application and go through the
//! [`WizardController`], so the same ordering, validation and locking rules
//! apply as in the web wizard.

use super::documents::{load_uploader, print_records};
use super::AppContext;
use crate::error::{CliError, Result};
use crate::review::{completion_percent, Consents, ReviewSummary, SubmissionGate};
use crate::session::ActiveApplication;
use crate::wizard::WizardController;
use crate::ApiClient;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use inquire::Confirm;
use scholar_common::types::{ApplicationId, Capability, ScholarshipId, StepId};
use scholar_common::{FieldErrors, SectionData};
use std::io::IsTerminal;
use std::path::Path;

fn step_path(id: &ApplicationId, step: StepId) -> String {
    format!("/student/applications/{}/{}", id, step.slug())
}

/// Start a draft for a scholarship, or pick up the existing one
pub async fn apply(ctx: &AppContext, scholarship_id: &str) -> Result<()> {
    ctx.require(Capability::ApplyForScholarship)?;
    let scholarship_id = ScholarshipId::new(scholarship_id);
    let scholarship = ctx.client.get_scholarship(&scholarship_id).await?;

    let draft = match ctx.client.find_my_application(&scholarship_id).await? {
        Some(draft) => {
            println!("{} Resuming your application for {}", "→".cyan(), scholarship.name.bold());
            draft
        }
        None => {
            let draft = ctx.client.create_application(&scholarship_id).await?;
            println!("{} Started an application for {}", "✓".green(), scholarship.name.bold());
            draft
        }
    };

    let wizard = WizardController::new(ctx.client.clone(), draft);
    {
        let mut session = ctx.session.lock();
        session.set_active_application(ActiveApplication {
            application_id: wizard.draft().id.clone(),
            scholarship_id: scholarship_id.clone(),
        });
        session.navigate(step_path(&wizard.draft().id, wizard.current_step()));
        session.save()?;
    }

    println!();
    print_progress(&wizard);
    Ok(())
}

fn print_progress(wizard: &WizardController<ApiClient>) {
    let draft = wizard.draft();
    println!(
        "Application {} ({}), {}% complete",
        draft.id.to_string().bold(),
        draft.status,
        completion_percent(draft)
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["#", "Step", "State"]);
    for step in StepId::ALL {
        let marker = if step == wizard.current_step() { "▸" } else { "" };
        table.add_row(vec![
            format!("{}{}", marker, step.index()),
            step.title().to_string(),
            wizard.state(step).label().to_string(),
        ]);
    }
    println!("{}", table);

    if wizard.is_locked() {
        println!("This application has been submitted and is read-only.");
    } else {
        let next = wizard.current_step();
        println!(
            "Next: step {} ({})",
            next.index().to_string().cyan(),
            next.title()
        );
    }
}

pub async fn status(ctx: &AppContext, application: Option<&str>) -> Result<()> {
    ctx.require(Capability::ApplyForScholarship)?;
    let id = ctx.active_application(application)?;
    let wizard = WizardController::resume(ctx.client.clone(), &id).await?;
    ctx.navigate(step_path(&id, wizard.current_step()));
    print_progress(&wizard);
    ctx.save_session()?;
    Ok(())
}

/// Read a section from a YAML or JSON file
pub fn read_section(step: StepId, path: &Path) -> Result<SectionData> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let payload: serde_json::Value = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(SectionData::from_payload(step, payload)?)
}

fn print_field_errors(errors: &FieldErrors) {
    println!("{}", "Please fix the following fields:".red().bold());
    for (field, message) in errors.iter() {
        println!("  {} {}", format!("{}:", field).yellow(), message);
    }
}

/// Validate and save one section
pub async fn save_section(
    ctx: &AppContext,
    application: Option<&str>,
    step: &str,
    file: &str,
    no_advance: bool,
) -> Result<()> {
    ctx.require(Capability::ApplyForScholarship)?;
    let id = ctx.active_application(application)?;
    let step: StepId = step.parse()?;
    if !step.has_form() {
        return Err(CliError::navigation(format!(
            "step {} ({}) has no form; use 'scholar documents' or 'scholar review'",
            step.index(),
            step.title()
        )));
    }
    let section = read_section(step, Path::new(file))?;

    let mut wizard = WizardController::resume(ctx.client.clone(), &id)
        .await?
        .with_auto_advance(!no_advance);
    wizard.jump_to(step)?;
    ctx.navigate(step_path(&id, step));

    match wizard.save_step(section).await {
        Ok(()) => {
            println!("{} Saved step {} ({})", "✓".green(), step.index(), step.title());
            ctx.navigate(step_path(&id, wizard.current_step()));
            ctx.save_session()?;
            if wizard.current_step() != step {
                println!(
                    "Next: step {} ({})",
                    wizard.current_step().index(),
                    wizard.current_step().title()
                );
            }
            Ok(())
        }
        Err(CliError::Validation(errors)) => {
            print_field_errors(&errors);
            ctx.save_session()?;
            Err(CliError::Validation(errors))
        }
        Err(err) => {
            ctx.persist_session();
            Err(err)
        }
    }
}

/// Store sections without validation, e.g. `financial=financial.yml`
pub async fn save_draft(ctx: &AppContext, application: Option<&str>, sections: &[String]) -> Result<()> {
    ctx.require(Capability::ApplyForScholarship)?;
    let id = ctx.active_application(application)?;

    let mut parsed = Vec::with_capacity(sections.len());
    for arg in sections {
        let (step, file) = arg.split_once('=').ok_or_else(|| {
            CliError::config(format!("'{}' is not STEP=FILE (e.g. financial=financial.yml)", arg))
        })?;
        let step: StepId = step.parse()?;
        parsed.push(read_section(step, Path::new(file.trim()))?);
    }

    let mut wizard = WizardController::resume(ctx.client.clone(), &id).await?;
    for section in parsed {
        wizard.edit(section)?;
    }
    wizard.save_draft().await?;

    println!("{} Draft saved ({} section(s))", "✓".green(), sections.len());
    Ok(())
}

/// Print everything entered so far and what still blocks submission
pub async fn review(ctx: &AppContext, application: Option<&str>) -> Result<()> {
    ctx.require(Capability::ApplyForScholarship)?;
    let id = ctx.active_application(application)?;
    ctx.navigate(step_path(&id, StepId::Review));

    let draft = ctx.client.get_application(&id).await?;
    let uploader = load_uploader(ctx, &draft).await?;

    println!("{}", ReviewSummary::new(&draft, &uploader));
    print_records(&uploader);
    println!();

    let reasons = SubmissionGate::new(&draft, &uploader, Consents::accepted()).blocking_reasons();
    if reasons.is_empty() {
        println!("{} Ready to submit: run 'scholar submit'", "✓".green());
    } else {
        println!("{}", "Before you can submit:".yellow().bold());
        for reason in reasons {
            println!("  - {}", reason);
        }
    }
    ctx.save_session()?;
    Ok(())
}

/// Ask for whichever consent was not given on the command line
fn collect_consents(confirm_accurate: bool, accept_terms: bool) -> Result<Consents> {
    let mut consents = Consents {
        information_accurate: confirm_accurate,
        terms_accepted: accept_terms,
    };
    if consents.all_given() || !std::io::stdin().is_terminal() {
        return Ok(consents);
    }

    if !consents.information_accurate {
        consents.information_accurate =
            Confirm::new("I confirm that the information provided is true and complete")
                .with_default(false)
                .prompt()?;
    }
    if !consents.terms_accepted {
        consents.terms_accepted = Confirm::new("I accept the scholarship terms and conditions")
            .with_default(false)
            .prompt()?;
    }
    Ok(consents)
}

pub async fn submit(
    ctx: &AppContext,
    application: Option<&str>,
    confirm_accurate: bool,
    accept_terms: bool,
) -> Result<()> {
    ctx.require(Capability::ApplyForScholarship)?;
    let id = ctx.active_application(application)?;
    ctx.navigate(step_path(&id, StepId::Review));

    let mut wizard = WizardController::resume(ctx.client.clone(), &id).await?;
    let mut uploader = load_uploader(ctx, wizard.draft()).await?;
    if wizard.is_locked() {
        return Err(CliError::Locked);
    }

    // The documents step may be complete on the backend without having been
    // recorded yet
    if uploader.all_required_uploaded() && !wizard.is_complete(StepId::Documents) {
        wizard.complete_documents_step(&uploader)?;
        wizard.save_draft().await?;
    }

    let consents = collect_consents(confirm_accurate, accept_terms)?;
    let receipt = wizard.submit(&uploader, consents).await?;
    uploader.lock();

    ctx.navigate("/student/dashboard");
    ctx.save_session()?;

    println!("{} Application {} submitted", "✓".green(), receipt.id.to_string().bold());
    if let Some(at) = receipt.submitted_at {
        println!("  Submitted at: {}", at.format("%Y-%m-%d %H:%M UTC"));
    }
    println!("  Status:       {}", receipt.status);
    Ok(())
}
