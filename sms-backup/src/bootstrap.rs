//! Bootstrap and historical sync: authorizes, starts the keep-alive host, backfills the most
//! recent inbox messages and asks for a battery-optimization exemption.

use crate::receiver::BACKUP_CHANNEL_ID;
use crate::service::BackupService;
use sms_core::{
    Importance, NotificationChannel, Notifier, Permission, PermissionGate, PowerManager,
    ToastDuration,
};
use std::sync::Arc;
use storage::{SmsInbox, StoreWriter};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

/// Upper bound on messages read and written by one historical sync.
pub const HISTORY_SYNC_LIMIT: u32 = 10;

pub const TOAST_ALREADY_GRANTED: &str = "Permissions already granted. Syncing...";
pub const TOAST_GRANTED: &str = "Permissions granted. Starting sync...";
pub const TOAST_DENIED: &str = "Permissions requirement for backup functionality.";
pub const TOAST_SYNC_DONE: &str = "All SMS synced!";
pub const TOAST_SYNC_ERROR: &str = "Error syncing SMS";

/// Counters of one historical sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub scanned: usize,
    pub saved: usize,
    pub failed: usize,
    /// Set when the inbox could not be read.
    pub error: Option<String>,
}

pub enum InitOutcome {
    /// Host started; the historical sync runs on the returned task.
    Started { sync: JoinHandle<SyncReport> },
    /// At least one permission was refused; nothing was started or written.
    Denied { denied: Vec<Permission> },
}

#[derive(Clone)]
pub struct SyncController {
    service: Arc<BackupService>,
    writer: StoreWriter,
    inbox: Arc<dyn SmsInbox>,
    notifier: Arc<dyn Notifier>,
    permissions: Arc<dyn PermissionGate>,
    power: Arc<dyn PowerManager>,
    notification_permission_required: bool,
}

impl SyncController {
    pub fn new(
        service: Arc<BackupService>,
        writer: StoreWriter,
        inbox: Arc<dyn SmsInbox>,
        notifier: Arc<dyn Notifier>,
        permissions: Arc<dyn PermissionGate>,
        power: Arc<dyn PowerManager>,
        notification_permission_required: bool,
    ) -> Self {
        Self {
            service,
            writer,
            inbox,
            notifier,
            permissions,
            power,
            notification_permission_required,
        }
    }

    pub fn required_permissions(&self) -> Vec<Permission> {
        let mut permissions = vec![
            Permission::ReadSms,
            Permission::ReceiveSms,
            Permission::ReadPhoneState,
        ];
        if self.notification_permission_required {
            permissions.push(Permission::PostNotifications);
        }
        permissions
    }

    /// Checks the required permissions and requests the missing ones.
    /// Returns the refused permissions on failure.
    pub async fn authorize(&self) -> Result<(), Vec<Permission>> {
        let missing: Vec<Permission> = self
            .required_permissions()
            .into_iter()
            .filter(|p| !self.permissions.check(*p))
            .collect();

        if missing.is_empty() {
            self.notifier
                .toast(TOAST_ALREADY_GRANTED, ToastDuration::Short);
            return Ok(());
        }

        info!(missing = ?missing, "step: requesting permissions");
        let answers = self.permissions.request(&missing).await;
        let denied: Vec<Permission> = missing
            .into_iter()
            .filter(|p| answers.get(p) != Some(&true))
            .collect();

        if denied.is_empty() {
            self.notifier.toast(TOAST_GRANTED, ToastDuration::Short);
            Ok(())
        } else {
            warn!(denied = ?denied, "Permissions denied, backup disabled");
            self.notifier.toast(TOAST_DENIED, ToastDuration::Long);
            Err(denied)
        }
    }

    /// Full bootstrap. Only a complete grant starts anything.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> InitOutcome {
        self.create_notification_channel().await;

        if let Err(denied) = self.authorize().await {
            return InitOutcome::Denied { denied };
        }

        if let Err(e) = self.service.start().await {
            error!(error = %e, "Failed to start BackupService");
        }

        let controller = self.clone();
        let sync = tokio::spawn(async move { controller.sync_existing().await });

        self.check_battery_optimizations();

        InitOutcome::Started { sync }
    }

    async fn create_notification_channel(&self) {
        let channel = NotificationChannel::new(BACKUP_CHANNEL_ID, "SMS Backup", Importance::Default)
            .with_description("Notifications for SMS Backup events");
        if let Err(e) = self.notifier.create_channel(&channel).await {
            warn!(error = %e, "Failed to create notification channel");
        }
    }

    fn check_battery_optimizations(&self) {
        if !self.power.is_ignoring_battery_optimizations() {
            self.power.request_ignore_battery_optimizations();
        }
    }

    /// Backs up the most recent inbox messages, newest first, one awaited write at a time,
    /// then reports the aggregate result as a toast.
    #[instrument(skip(self))]
    pub async fn sync_existing(&self) -> SyncReport {
        let rows = match self.inbox.recent(HISTORY_SYNC_LIMIT).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "Error syncing SMS");
                self.notifier.toast(TOAST_SYNC_ERROR, ToastDuration::Short);
                return SyncReport {
                    error: Some(e.to_string()),
                    ..SyncReport::default()
                };
            }
        };

        let mut report = SyncReport::default();
        for row in rows.into_iter().take(HISTORY_SYNC_LIMIT as usize) {
            report.scanned += 1;
            let address = row.address.unwrap_or_else(|| "Unknown".to_string());
            let body = row.body.unwrap_or_default();
            if self.writer.save(&address, &body, row.date).await {
                report.saved += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            scanned = report.scanned,
            saved = report.saved,
            failed = report.failed,
            "step: historical sync finished"
        );

        if report.scanned == 0 {
            return report;
        }

        if report.failed == 0 {
            self.notifier.toast(TOAST_SYNC_DONE, ToastDuration::Short);
        } else {
            self.notifier.toast(
                &format!(
                    "Synced {} of {} SMS, {} failed",
                    report.saved, report.scanned, report.failed
                ),
                ToastDuration::Short,
            );
        }
        report
    }
}
