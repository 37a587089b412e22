//! Interview slot selection

use crate::api::{Booking, InterviewSlot};
use crate::error::{CliError, Result};
use chrono::{DateTime, Utc};

const CANCELLED: &str = "cancelled";

/// Slots that start in the future and still have room, earliest first
pub fn open_slots(slots: &[InterviewSlot], now: DateTime<Utc>) -> Vec<InterviewSlot> {
    let mut open: Vec<InterviewSlot> = slots
        .iter()
        .filter(|slot| slot.starts_at > now && slot.remaining() > 0)
        .cloned()
        .collect();
    open.sort_by_key(|slot| slot.starts_at);
    open
}

/// Reject a booking the backend would refuse anyway
///
/// One active booking per scholarship. A booking counts toward that limit
/// when its slot belongs to the same scholarship; bookings returned without
/// slot details are matched by slot id only.
pub fn check_booking(slot: &InterviewSlot, existing: &[Booking], now: DateTime<Utc>) -> Result<()> {
    if slot.starts_at <= now {
        return Err(CliError::Interview(format!("slot {} has already started", slot.id)));
    }
    if slot.remaining() == 0 {
        return Err(CliError::Interview(format!("slot {} is fully booked", slot.id)));
    }

    let clash = existing
        .iter()
        .filter(|booking| !booking.status.eq_ignore_ascii_case(CANCELLED))
        .find(|booking| match &booking.slot {
            Some(booked) => booked.scholarship_id == slot.scholarship_id,
            None => booking.slot_id == slot.id,
        });

    if let Some(booking) = clash {
        return Err(CliError::Interview(format!(
            "already booked for this scholarship (booking {})",
            booking.id
        )));
    }
    Ok(())
}
