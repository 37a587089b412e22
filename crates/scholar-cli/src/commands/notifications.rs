//! `scholar notifications list|read|read-all|delete|watch`

use super::AppContext;
use crate::api::Notification;
use crate::error::Result;
use crate::notifications::{NotificationPoller, PollUpdate};
use colored::Colorize;
use scholar_common::types::{Capability, NotificationId};
use std::time::Duration;
use tokio::sync::watch;

fn print_notification(notification: &Notification) {
    let marker = if notification.is_read { " ".normal() } else { "●".blue() };
    println!(
        "{} [{}] {} {}",
        marker,
        notification.id,
        notification.created_at.format("%Y-%m-%d %H:%M"),
        notification.title.bold()
    );
    if !notification.message.is_empty() {
        println!("    {}", notification.message);
    }
}

pub async fn list(ctx: &AppContext, unread_only: bool) -> Result<()> {
    ctx.require(Capability::ReceiveNotifications)?;
    ctx.navigate("/notifications");

    let notifications: Vec<Notification> = ctx
        .client
        .notifications()
        .await?
        .into_iter()
        .filter(|notification| !unread_only || !notification.is_read)
        .collect();

    if notifications.is_empty() {
        println!("No notifications.");
        return Ok(());
    }
    for notification in &notifications {
        print_notification(notification);
    }
    Ok(())
}

pub async fn read(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.require(Capability::ReceiveNotifications)?;
    ctx.client.mark_read(&NotificationId::new(id)).await?;
    println!("{} Marked {} as read", "✓".green(), id);
    Ok(())
}

pub async fn read_all(ctx: &AppContext) -> Result<()> {
    ctx.require(Capability::ReceiveNotifications)?;
    ctx.client.mark_all_read().await?;
    println!("{} All notifications marked as read", "✓".green());
    Ok(())
}

pub async fn delete(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.require(Capability::ReceiveNotifications)?;
    ctx.client.delete_notification(&NotificationId::new(id)).await?;
    println!("{} Deleted notification {}", "✓".green(), id);
    Ok(())
}

fn report(update: &PollUpdate) {
    for notification in &update.new {
        print_notification(notification);
    }
}

/// Poll until Ctrl-C or until the session expires
pub async fn watch(ctx: &AppContext, interval: Option<u64>) -> Result<()> {
    ctx.require(Capability::ReceiveNotifications)?;
    let every = Duration::from_secs(interval.unwrap_or(ctx.config.notification_poll_secs).max(1));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    println!(
        "Watching for notifications every {}s (Ctrl-C to stop)",
        every.as_secs()
    );
    let result = NotificationPoller::new(ctx.client.clone())
        .run(every, shutdown_rx, report)
        .await;
    ctx.save_session()?;
    result
}
