//! `scholar interview slots|book|list`

use super::AppContext;
use crate::api::InterviewSlot;
use crate::error::{CliError, Result};
use crate::interview::{check_booking, open_slots};
use chrono::Utc;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use scholar_common::types::{Capability, ScholarshipId, SlotId};

fn scholarship_for(ctx: &AppContext, explicit: Option<&str>) -> Result<ScholarshipId> {
    if let Some(id) = explicit {
        return Ok(ScholarshipId::new(id));
    }
    ctx.session
        .lock()
        .active_application
        .as_ref()
        .map(|active| active.scholarship_id.clone())
        .ok_or(CliError::NoActiveApplication)
}

fn slot_table(slots: &[InterviewSlot]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Slot", "Starts", "Ends", "Location", "Seats left"]);
    for slot in slots {
        table.add_row(vec![
            slot.id.to_string(),
            slot.starts_at.format("%Y-%m-%d %H:%M").to_string(),
            slot.ends_at.format("%H:%M").to_string(),
            slot.location.clone().unwrap_or_default(),
            slot.remaining().to_string(),
        ]);
    }
    table
}

pub async fn slots(ctx: &AppContext, scholarship: Option<&str>) -> Result<()> {
    ctx.require(Capability::BookInterview)?;
    let scholarship_id = scholarship_for(ctx, scholarship)?;
    ctx.navigate("/student/interviews");

    let slots = open_slots(&ctx.client.interview_slots(&scholarship_id).await?, Utc::now());
    if slots.is_empty() {
        println!("No open interview slots for scholarship {}.", scholarship_id);
        return Ok(());
    }

    println!("{}", slot_table(&slots));
    println!("Book with: {}", "scholar interview book <slot>".cyan());
    Ok(())
}

/// Book a slot of the active application's scholarship
pub async fn book(ctx: &AppContext, slot_id: &str) -> Result<()> {
    ctx.require(Capability::BookInterview)?;
    let scholarship_id = scholarship_for(ctx, None)?;
    let slot_id = SlotId::new(slot_id);
    ctx.navigate("/student/interviews");

    let slots = ctx.client.interview_slots(&scholarship_id).await?;
    let slot = slots
        .iter()
        .find(|slot| slot.id == slot_id)
        .ok_or_else(|| CliError::NotFound(format!("interview slot {}", slot_id)))?;

    let existing = ctx.client.my_bookings().await?;
    check_booking(slot, &existing, Utc::now())?;

    let booking = ctx.client.book_interview(&slot_id).await?;
    println!(
        "{} Booked interview on {} (booking {})",
        "✓".green(),
        slot.starts_at.format("%Y-%m-%d %H:%M UTC"),
        booking.id
    );
    if let Some(location) = &slot.location {
        println!("  Location: {}", location);
    }
    Ok(())
}

pub async fn list(ctx: &AppContext) -> Result<()> {
    ctx.require(Capability::BookInterview)?;
    ctx.navigate("/student/interviews");

    let bookings = ctx.client.my_bookings().await?;
    if bookings.is_empty() {
        println!("You have no interview bookings.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Booking", "Slot", "When", "Location", "Status"]);
    for booking in &bookings {
        let (when, location) = match &booking.slot {
            Some(slot) => (
                slot.starts_at.format("%Y-%m-%d %H:%M").to_string(),
                slot.location.clone().unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };
        table.add_row(vec![
            booking.id.to_string(),
            booking.slot_id.to_string(),
            when,
            location,
            booking.status.clone(),
        ]);
    }
    println!("{}", table);
    Ok(())
}
