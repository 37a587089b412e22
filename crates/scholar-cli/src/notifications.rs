//! Notification polling
//!
//! The portal has no push channel, so the unread badge is refreshed by
//! polling the backend on a fixed interval.

use crate::api::Notification;
use crate::error::Result;
use async_trait::async_trait;
use scholar_common::types::NotificationId;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Read side of the notifications API
#[async_trait]
pub trait NotificationFeed: Send + Sync {
    async fn unread_count(&self) -> Result<u64>;

    /// Most recent notifications, newest first
    async fn recent(&self) -> Result<Vec<Notification>>;
}

/// What changed since the previous poll
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollUpdate {
    pub unread: u64,
    /// Unread notifications not reported before
    pub new: Vec<Notification>,
}

pub struct NotificationPoller<F> {
    feed: F,
    seen: HashSet<NotificationId>,
    last_unread: Option<u64>,
}

impl<F: NotificationFeed> NotificationPoller<F> {
    pub fn new(feed: F) -> Self {
        Self {
            feed,
            seen: HashSet::new(),
            last_unread: None,
        }
    }

    pub fn last_unread(&self) -> Option<u64> {
        self.last_unread
    }

    /// Fetch the unread count, and the list while anything is unread
    ///
    /// The count alone cannot tell a new notification from one that replaced
    /// a notification read in between, so the list is checked on every poll
    /// with unread items. `seen` only keeps ids still in that list.
    pub async fn poll_once(&mut self) -> Result<PollUpdate> {
        let unread = self.feed.unread_count().await?;
        let mut update = PollUpdate {
            unread,
            new: Vec::new(),
        };

        if unread == 0 {
            self.seen.clear();
        } else {
            let recent = self.feed.recent().await?;
            let mut still_listed = HashSet::with_capacity(recent.len());
            for notification in recent {
                still_listed.insert(notification.id.clone());
                if !notification.is_read && !self.seen.contains(&notification.id) {
                    update.new.push(notification);
                }
            }
            self.seen = still_listed;
        }

        self.last_unread = Some(unread);
        debug!(unread, new = update.new.len(), "Polled notifications");
        Ok(update)
    }

    /// Poll until `shutdown` flips to `true`
    ///
    /// The first poll happens immediately. An expired session ends the loop
    /// with the error; any other failure is logged and retried on the next
    /// tick.
    pub async fn run<C>(
        mut self,
        every: Duration,
        mut shutdown: watch::Receiver<bool>,
        mut on_update: C,
    ) -> Result<()>
    where
        C: FnMut(&PollUpdate) + Send,
    {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.poll_once().await {
                        Ok(update) => on_update(&update),
                        Err(err) if err.is_session_expired() => return Err(err),
                        Err(err) => warn!(error = %err, "Notification poll failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return Ok(());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeFeed {
        notifications: Mutex<Vec<Notification>>,
        list_calls: Mutex<usize>,
        expired: Mutex<bool>,
    }

    impl FakeFeed {
        fn push(&self, id: &str, is_read: bool) {
            self.notifications.lock().unwrap().insert(
                0,
                Notification {
                    id: id.into(),
                    title: format!("Notice {}", id),
                    message: String::new(),
                    notification_type: None,
                    is_read,
                    created_at: Utc::now(),
                },
            );
        }
    }

    #[async_trait]
    impl NotificationFeed for Arc<FakeFeed> {
        async fn unread_count(&self) -> Result<u64> {
            if *self.expired.lock().unwrap() {
                return Err(CliError::SessionExpired {
                    redirect: Some("/login?expired=1".to_string()),
                });
            }
            let unread = self.notifications.lock().unwrap().iter().filter(|n| !n.is_read).count();
            Ok(unread as u64)
        }

        async fn recent(&self) -> Result<Vec<Notification>> {
            *self.list_calls.lock().unwrap() += 1;
            Ok(self.notifications.lock().unwrap().clone())
        }
    }

    #[tokio::test]
    async fn test_poll_reports_each_notification_once() {
        let feed = Arc::new(FakeFeed::default());
        feed.push("1", false);
        feed.push("2", true);
        let mut poller = NotificationPoller::new(feed.clone());

        let update = poller.poll_once().await.unwrap();
        assert_eq!(update.unread, 1);
        assert_eq!(update.new.len(), 1);
        assert_eq!(update.new[0].id.as_str(), "1");

        let update = poller.poll_once().await.unwrap();
        assert!(update.new.is_empty());

        feed.push("3", false);
        let update = poller.poll_once().await.unwrap();
        assert_eq!(update.unread, 2);
        let ids: Vec<&str> = update.new.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["3"]);
    }

    #[tokio::test]
    async fn test_poll_sees_new_notification_behind_unchanged_count() {
        let feed = Arc::new(FakeFeed::default());
        feed.push("1", false);
        let mut poller = NotificationPoller::new(feed.clone());
        assert_eq!(poller.poll_once().await.unwrap().new.len(), 1);

        // One read, one arrived: still a single unread
        feed.notifications.lock().unwrap()[0].is_read = true;
        feed.push("2", false);

        let update = poller.poll_once().await.unwrap();
        assert_eq!(update.unread, 1);
        let ids: Vec<&str> = update.new.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[tokio::test]
    async fn test_seen_ids_follow_the_latest_list() {
        let feed = Arc::new(FakeFeed::default());
        feed.push("1", false);
        feed.push("2", false);
        let mut poller = NotificationPoller::new(feed.clone());
        poller.poll_once().await.unwrap();
        assert_eq!(poller.seen.len(), 2);

        feed.notifications.lock().unwrap().retain(|n| n.id.as_str() == "2");
        poller.poll_once().await.unwrap();
        assert_eq!(poller.seen.len(), 1);

        feed.notifications.lock().unwrap()[0].is_read = true;
        poller.poll_once().await.unwrap();
        assert!(poller.seen.is_empty());
        assert_eq!(*feed.list_calls.lock().unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let feed = Arc::new(FakeFeed::default());
        feed.push("1", false);
        let (stop_tx, stop_rx) = watch::channel(false);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let task = tokio::spawn(NotificationPoller::new(feed.clone()).run(
            Duration::from_secs(30),
            stop_rx,
            move |update| sink.lock().unwrap().push(update.unread),
        ));

        tokio::time::sleep(Duration::from_secs(65)).await;
        stop_tx.send(true).unwrap();
        task.await.unwrap().unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 1, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ends_on_expired_session() {
        let feed = Arc::new(FakeFeed::default());
        *feed.expired.lock().unwrap() = true;
        let (_stop_tx, stop_rx) = watch::channel(false);

        let result = NotificationPoller::new(feed)
            .run(Duration::from_secs(30), stop_rx, |_| {})
            .await;
        assert!(result.unwrap_err().is_session_expired());
    }
}
