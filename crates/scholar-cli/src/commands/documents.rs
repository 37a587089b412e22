//! `scholar documents list|upload`

use super::AppContext;
use crate::documents::{DocumentUploader, UploadFile, UploadStatus};
use crate::error::{CliError, Result};
use crate::progress::{self, format_bytes};
use crate::wizard::WizardController;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use indicatif::MultiProgress;
use scholar_common::types::{Capability, DocumentKind, StepId};
use scholar_common::ApplicationDraft;

/// Uploader for `draft`, hydrated from the backend
///
/// The catalogue follows the scholarship's own document list. Submitted
/// applications get a locked uploader.
pub(crate) async fn load_uploader(ctx: &AppContext, draft: &ApplicationDraft) -> Result<DocumentUploader> {
    let scholarship = ctx.client.get_scholarship(&draft.scholarship_id).await?;
    let mut uploader = DocumentUploader::with_catalogue(draft.id.clone(), scholarship.document_catalogue());
    uploader.refresh(&ctx.client).await?;
    if !draft.status.is_editable() {
        uploader.lock();
    }
    Ok(uploader)
}

pub(crate) fn print_records(uploader: &DocumentUploader) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Type", "Required", "File", "Size", "Status"]);

    for record in uploader.records() {
        let status = match &record.status {
            UploadStatus::Missing => "missing".to_string(),
            UploadStatus::Uploading { progress } => format!("uploading {}%", progress),
            UploadStatus::Success => "uploaded".to_string(),
            UploadStatus::Error { message } => format!("failed: {}", message),
        };
        table.add_row(vec![
            record.kind.to_string(),
            if record.required { "yes" } else { "no" }.to_string(),
            record.file_name.clone().unwrap_or_default(),
            if record.size_bytes > 0 {
                format_bytes(record.size_bytes)
            } else {
                String::new()
            },
            status,
        ]);
    }

    println!("{}", table);
    println!(
        "Required documents: {}% uploaded",
        uploader.completion_percent()
    );
}

pub async fn list(ctx: &AppContext, application: Option<&str>) -> Result<()> {
    ctx.require(Capability::ApplyForScholarship)?;
    let id = ctx.active_application(application)?;
    ctx.navigate(format!("/student/applications/{}/{}", id, StepId::Documents.slug()));

    let draft = ctx.client.get_application(&id).await?;
    let uploader = load_uploader(ctx, &draft).await?;
    print_records(&uploader);
    Ok(())
}

/// Split a `TYPE=PATH` argument
fn parse_upload_arg(arg: &str) -> Result<(DocumentKind, String)> {
    let (kind, path) = arg.split_once('=').ok_or_else(|| {
        CliError::config(format!("'{}' is not TYPE=PATH (e.g. transcript=grades.pdf)", arg))
    })?;
    Ok((kind.parse()?, path.trim().to_string()))
}

/// Validate every file, then upload them concurrently
///
/// Nothing is sent when any file fails validation. Once every required type
/// is uploaded the documents step is marked complete.
pub async fn upload(ctx: &AppContext, application: Option<&str>, files: &[String]) -> Result<()> {
    ctx.require(Capability::ApplyForScholarship)?;
    let id = ctx.active_application(application)?;
    ctx.navigate(format!("/student/applications/{}/{}", id, StepId::Documents.slug()));

    let draft = ctx.client.get_application(&id).await?;
    let mut uploader = load_uploader(ctx, &draft).await?;

    let mut pending = Vec::with_capacity(files.len());
    for arg in files {
        let (kind, path) = parse_upload_arg(arg)?;
        let file = UploadFile::read(&path).await?;
        pending.push(uploader.begin_upload(kind, file)?);
    }

    let bars = MultiProgress::new();
    let mut followers = Vec::with_capacity(pending.len());
    for upload in &pending {
        let pb = bars.add(progress::create_upload_progress(upload.file_name()));
        followers.push((pb.clone(), tokio::spawn(progress::follow(pb, upload.progress()))));
    }

    let outcomes =
        futures::future::join_all(pending.into_iter().map(|upload| upload.send(&ctx.client))).await;
    for (pb, follower) in followers {
        follower.abort();
        pb.finish();
    }

    let mut failures = Vec::new();
    for outcome in outcomes {
        let kind = outcome.kind;
        let file_name = outcome.file_name.clone();
        match uploader.finish(outcome, &ctx.client).await {
            Ok(()) => println!("{} {} uploaded as {}", "✓".green(), file_name, kind),
            Err(err) if err.is_session_expired() => return Err(err),
            Err(err) => {
                println!("{} {}: {}", "✗".red(), file_name, err);
                failures.push(format!("{}: {}", file_name, err));
            }
        }
    }

    println!();
    print_records(&uploader);

    if uploader.all_required_uploaded() && !draft.is_step_complete(StepId::Documents) {
        let mut wizard = WizardController::new(ctx.client.clone(), draft);
        wizard.complete_documents_step(&uploader)?;
        wizard.save_draft().await?;
        println!("{} Documents step complete", "✓".green());
    }
    ctx.save_session()?;

    if failures.is_empty() {
        Ok(())
    } else {
        Err(CliError::api(format!("{} upload(s) failed: {}", failures.len(), failures.join("; "))))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload_arg() {
        let (kind, path) = parse_upload_arg("id-card=scans/id.pdf").unwrap();
        assert_eq!(kind, DocumentKind::IdCard);
        assert_eq!(path, "scans/id.pdf");

        assert!(parse_upload_arg("id.pdf").is_err());
        assert!(matches!(
            parse_upload_arg("passport=p.pdf"),
            Err(CliError::Common(_))
        ));
    }
}
