//! SMS event listener: turns each SMS-received broadcast into store writes and per-fragment
//! outcome notifications.

use sms_core::{
    messages_from_intent, BroadcastReceiver, Intent, Notification, Notifier, PendingResult,
    Permission, PermissionGate, PowerManager, ReceiverContext, SmsBackupError, ToastDuration,
    WakeLock, SMS_RECEIVED_ACTION,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storage::StoreWriter;
use tracing::{debug, error, info, instrument, warn};

/// Channel for per-message outcome notifications.
pub const BACKUP_CHANNEL_ID: &str = "backup_channel";
pub const WAKE_LOCK_TAG: &str = "SmsBackup::SmsReceiverWakelock";

pub const TITLE_BACKED_UP: &str = "SMS Backed Up";
pub const TITLE_BACKUP_FAILED: &str = "Backup Failed!";
pub const TOAST_NEW_SMS: &str = "New SMS Received!";

/// Owns the wake lock and grace-period token of one event; dropping it releases both.
struct ReceiveGuard {
    wake_lock: Box<dyn WakeLock>,
    pending: Option<PendingResult>,
}

impl Drop for ReceiveGuard {
    fn drop(&mut self) {
        if self.wake_lock.is_held() {
            self.wake_lock.release();
        }
        if let Some(pending) = self.pending.take() {
            pending.finish();
        }
    }
}

/// Broadcast receiver for [`SMS_RECEIVED_ACTION`]. Cheap to clone; every event runs on its own task.
#[derive(Clone)]
pub struct SmsReceiver {
    writer: StoreWriter,
    notifier: Arc<dyn Notifier>,
    permissions: Arc<dyn PermissionGate>,
    power: Arc<dyn PowerManager>,
    wake_lock_timeout: Duration,
    /// When false, notifications are posted without consulting POST_NOTIFICATIONS.
    notification_permission_required: bool,
    next_notification_id: Arc<AtomicU32>,
}

impl SmsReceiver {
    pub fn new(
        writer: StoreWriter,
        notifier: Arc<dyn Notifier>,
        permissions: Arc<dyn PermissionGate>,
        power: Arc<dyn PowerManager>,
        wake_lock_timeout: Duration,
        notification_permission_required: bool,
    ) -> Self {
        Self {
            writer,
            notifier,
            permissions,
            power,
            wake_lock_timeout,
            notification_permission_required,
            // id 1 belongs to the foreground status notification
            next_notification_id: Arc::new(AtomicU32::new(2)),
        }
    }

    /// Extracts the fragments of `intent` and backs each one up in order.
    /// Returns the number of fragments processed.
    #[instrument(skip(self, intent))]
    pub async fn process(&self, intent: &Intent) -> Result<usize, SmsBackupError> {
        self.notifier.toast(TOAST_NEW_SMS, ToastDuration::Long);

        let fragments = messages_from_intent(intent)?;
        for fragment in &fragments {
            let sender = fragment.sender();
            let body = fragment.body();
            let timestamp = fragment.timestamp_millis;

            debug!(sender = %sender, timestamp, "SMS received from");

            let success = self.writer.save(&sender, &body, timestamp).await;
            let title = if success {
                TITLE_BACKED_UP
            } else {
                TITLE_BACKUP_FAILED
            };
            self.show_notification(&sender, title).await;
        }

        Ok(fragments.len())
    }

    async fn show_notification(&self, sender: &str, title: &str) {
        if self.notification_permission_required
            && !self.permissions.check(Permission::PostNotifications)
        {
            debug!("POST_NOTIFICATIONS not granted, skipping notification");
            return;
        }

        let notification = Notification::new(
            BACKUP_CHANNEL_ID,
            title,
            &format!("Message from {}", sender),
        )
        .auto_cancel(true);
        let id = self.next_notification_id.fetch_add(1, Ordering::Relaxed);

        if let Err(e) = self.notifier.notify(id, &notification).await {
            warn!(error = %e, title = %title, "Failed to post notification");
        }
    }
}

impl BroadcastReceiver for SmsReceiver {
    fn on_receive(&self, ctx: &ReceiverContext, intent: &Intent) {
        debug!(action = %intent.action, "onReceive triggered");

        if intent.action != SMS_RECEIVED_ACTION {
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, "No async runtime to process SMS on");
                return;
            }
        };

        let mut wake_lock = self.power.new_wake_lock(WAKE_LOCK_TAG);
        wake_lock.acquire(self.wake_lock_timeout);
        let guard = ReceiveGuard {
            wake_lock,
            pending: Some(ctx.go_async()),
        };

        let receiver = self.clone();
        let intent = intent.clone();
        runtime.spawn(async move {
            let _guard = guard;
            match receiver.process(&intent).await {
                Ok(count) => info!(fragments = count, "step: SMS event processed"),
                Err(e) => error!(error = %e, "Error processing SMS"),
            }
        });
    }
}
