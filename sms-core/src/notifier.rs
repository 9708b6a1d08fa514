//! User-facing surface: notification channels, notifications, foreground status, toasts.
//!
//! [`Notifier`] is backend-agnostic; [`TracingNotifier`] renders everything as structured log events.

use crate::error::{Result, SmsBackupError};
use crate::types::{ForegroundServiceType, Notification, NotificationChannel, ToastDuration};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{info, warn};

/// Posts user-visible feedback. Implementations map to a platform notification service.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Registers (or updates) a channel. Notifications on unknown channels are rejected.
    async fn create_channel(&self, channel: &NotificationChannel) -> Result<()>;
    /// Posts or replaces the notification with the given id.
    async fn notify(&self, id: u32, notification: &Notification) -> Result<()>;
    /// Shows the persistent status notification of a foreground service.
    async fn start_foreground(
        &self,
        id: u32,
        notification: &Notification,
        service_type: ForegroundServiceType,
    ) -> Result<()>;
    /// Removes the foreground status notification.
    async fn stop_foreground(&self, id: u32) -> Result<()>;
    /// Transient banner. Must return immediately; delivery is best-effort.
    fn toast(&self, text: &str, duration: ToastDuration);
}

/// Log-backed [`Notifier`] for headless hosts.
#[derive(Default)]
pub struct TracingNotifier {
    channels: RwLock<HashMap<String, NotificationChannel>>,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_channel(&self, channel_id: &str) -> Result<()> {
        let channels = self
            .channels
            .read()
            .map_err(|e| SmsBackupError::Notify(e.to_string()))?;
        if channels.contains_key(channel_id) {
            Ok(())
        } else {
            warn!(channel_id = %channel_id, "Notification posted to unknown channel");
            Err(SmsBackupError::Notify(format!(
                "unknown channel: {}",
                channel_id
            )))
        }
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn create_channel(&self, channel: &NotificationChannel) -> Result<()> {
        let mut channels = self
            .channels
            .write()
            .map_err(|e| SmsBackupError::Notify(e.to_string()))?;
        info!(
            channel_id = %channel.id,
            name = %channel.name,
            importance = ?channel.importance,
            "Notification channel created"
        );
        channels.insert(channel.id.clone(), channel.clone());
        Ok(())
    }

    async fn notify(&self, id: u32, notification: &Notification) -> Result<()> {
        self.ensure_channel(&notification.channel_id)?;
        info!(
            target: "sms_backup::notification",
            id,
            channel_id = %notification.channel_id,
            title = %notification.title,
            text = %notification.text,
            "Notification"
        );
        Ok(())
    }

    async fn start_foreground(
        &self,
        id: u32,
        notification: &Notification,
        service_type: ForegroundServiceType,
    ) -> Result<()> {
        self.ensure_channel(&notification.channel_id)?;
        info!(
            target: "sms_backup::notification",
            id,
            service_type = ?service_type,
            title = %notification.title,
            text = %notification.text,
            "Foreground status"
        );
        Ok(())
    }

    async fn stop_foreground(&self, id: u32) -> Result<()> {
        info!(target: "sms_backup::notification", id, "Foreground status removed");
        Ok(())
    }

    fn toast(&self, text: &str, duration: ToastDuration) {
        info!(target: "sms_backup::toast", duration = ?duration, "{}", text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Importance;

    #[tokio::test]
    async fn test_notify_requires_channel() {
        let notifier = TracingNotifier::new();
        let notification = Notification::new("backup_channel", "SMS Backed Up", "Message from 1");

        assert!(notifier.notify(1, &notification).await.is_err());

        notifier
            .create_channel(&NotificationChannel::new(
                "backup_channel",
                "SMS Backup",
                Importance::Default,
            ))
            .await
            .unwrap();
        assert!(notifier.notify(1, &notification).await.is_ok());
    }
}
