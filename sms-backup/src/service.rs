//! Keep-alive host: holds the foreground status and keeps [`SmsReceiver`] registered.

use crate::receiver::SmsReceiver;
use sms_core::{
    BroadcastHub, ForegroundServiceType, Importance, IntentFilter, Notification,
    NotificationChannel, Notifier, RegistrationId, Result, SMS_RECEIVED_ACTION,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

pub const SERVICE_CHANNEL_ID: &str = "BackupServiceChannel";
pub const FOREGROUND_NOTIFICATION_ID: u32 = 1;
/// Dispatch priority of the receiver, ahead of default-priority consumers of the same event.
pub const RECEIVER_PRIORITY: i32 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Stopped,
    Running,
}

struct Running {
    registration: RegistrationId,
    heartbeat: JoinHandle<()>,
}

pub struct BackupService {
    hub: Arc<BroadcastHub>,
    receiver: Arc<SmsReceiver>,
    notifier: Arc<dyn Notifier>,
    heartbeat_interval: Duration,
    running: Mutex<Option<Running>>,
}

impl BackupService {
    pub fn new(
        hub: Arc<BroadcastHub>,
        receiver: Arc<SmsReceiver>,
        notifier: Arc<dyn Notifier>,
        heartbeat_interval: Duration,
    ) -> Self {
        Self {
            hub,
            receiver,
            notifier,
            heartbeat_interval,
            running: Mutex::new(None),
        }
    }

    /// Enters the foreground, registers the receiver and starts the heartbeat. No-op when running.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<()> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            debug!("BackupService already running");
            return Ok(());
        }

        self.notifier
            .create_channel(&NotificationChannel::new(
                SERVICE_CHANNEL_ID,
                "Backup Service Channel",
                Importance::Low,
            ))
            .await?;

        let status = Notification::new(
            SERVICE_CHANNEL_ID,
            "SMS Backup Active",
            "Listening for incoming messages...",
        );
        if let Err(e) = self
            .notifier
            .start_foreground(
                FOREGROUND_NOTIFICATION_ID,
                &status,
                ForegroundServiceType::DataSync,
            )
            .await
        {
            warn!(error = %e, "Failed to show foreground status");
        }

        let registration = self.hub.register(
            self.receiver.clone(),
            IntentFilter::new(SMS_RECEIVED_ACTION).with_priority(RECEIVER_PRIORITY),
        );
        info!(
            priority = RECEIVER_PRIORITY,
            "Dynamic SmsReceiver registered"
        );

        let heartbeat = tokio::spawn(heartbeat(self.heartbeat_interval));

        *running = Some(Running {
            registration,
            heartbeat,
        });
        Ok(())
    }

    /// Unregisters the receiver, stops the heartbeat and leaves the foreground. No-op when stopped.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        let Some(running) = self.running.lock().await.take() else {
            debug!("BackupService not running");
            return;
        };

        self.hub.unregister(running.registration);
        running.heartbeat.abort();
        if let Err(e) = self
            .notifier
            .stop_foreground(FOREGROUND_NOTIFICATION_ID)
            .await
        {
            warn!(error = %e, "Failed to remove foreground status");
        }
        info!("BackupService stopped");
    }

    pub async fn state(&self) -> ServiceState {
        if self.running.lock().await.is_some() {
            ServiceState::Running
        } else {
            ServiceState::Stopped
        }
    }
}

async fn heartbeat(interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        debug!("Service is running and listening...");
    }
}
