//! `scholar scholarship show`

use super::AppContext;
use crate::error::Result;
use crate::progress::format_bytes;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use scholar_common::types::ScholarshipId;

/// Show scholarship details and the documents it asks for
pub async fn show(ctx: &AppContext, id: &str) -> Result<()> {
    let id = ScholarshipId::new(id);
    ctx.navigate(format!("/scholarships/{}", id));
    let scholarship = ctx.client.get_scholarship(&id).await?;

    println!();
    println!("{}", scholarship.name.bold());
    if let Some(description) = &scholarship.description {
        println!("{}", description);
    }
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS);
    table.add_row(vec!["ID".to_string(), scholarship.id.to_string()]);
    if let Some(amount) = scholarship.amount {
        table.add_row(vec!["Amount".to_string(), format!("{:.2}", amount)]);
    }
    if let Some(deadline) = &scholarship.application_deadline {
        table.add_row(vec!["Deadline".to_string(), deadline.clone()]);
    }
    if let Some(status) = &scholarship.status {
        table.add_row(vec!["Status".to_string(), status.clone()]);
    }
    println!("{}", table);

    let mut documents = Table::new();
    documents
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Document", "Type", "Required", "Max size", "Formats"]);
    for requirement in scholarship.document_catalogue() {
        documents.add_row(vec![
            requirement.label.to_string(),
            requirement.kind.to_string(),
            if requirement.required { "yes" } else { "no" }.to_string(),
            format_bytes(requirement.max_size_bytes),
            requirement.allowed_extensions.join(", "),
        ]);
    }
    println!("{}", documents);
    println!();
    println!("Apply with: {}", format!("scholar apply {}", scholarship.id).cyan());

    Ok(())
}
