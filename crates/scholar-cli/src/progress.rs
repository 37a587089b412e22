//! Progress bar utilities for CLI operations

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::watch;

/// Bar counting 0..=100 percent for one document upload
pub fn create_upload_progress(message: &str) -> ProgressBar {
    let pb = ProgressBar::new(100);
    let style = ProgressStyle::with_template("{msg:<28} [{bar:30.cyan/blue}] {pos:>3}%")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Spinner for a single backend call
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Mirror an upload's progress channel onto a bar until the sender is gone
pub async fn follow(pb: ProgressBar, mut progress: watch::Receiver<u8>) {
    loop {
        pb.set_position(u64::from(*progress.borrow_and_update()));
        if progress.changed().await.is_err() {
            break;
        }
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit_idx])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(900), "900 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(10 * 1024 * 1024), "10.0 MB");
        assert_eq!(format_bytes(11 * 1024 * 1024), "11.0 MB");
    }

    #[test]
    fn test_upload_progress_counts_percent() {
        let pb = create_upload_progress("transcript.pdf");
        assert_eq!(pb.length(), Some(100));
    }

    #[tokio::test]
    async fn test_follow_tracks_last_value() {
        let pb = ProgressBar::hidden();
        pb.set_length(100);
        let (tx, rx) = watch::channel(0u8);

        let task = tokio::spawn(follow(pb.clone(), rx));
        tx.send_replace(40);
        tx.send_replace(100);
        drop(tx);
        task.await.unwrap();

        assert_eq!(pb.position(), 100);
    }
}
