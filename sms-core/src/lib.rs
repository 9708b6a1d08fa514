//! # sms-core
//!
//! Core types and host-environment seams for the SMS backup service: intents and broadcast
//! dispatch, SMS fragment extraction, permissions, notifications, power management, and
//! tracing initialization. Platform-agnostic; used by storage callers and the sms-backup app.

pub mod broadcast;
pub mod error;
pub mod logger;
pub mod notifier;
pub mod permissions;
pub mod power;
pub mod telephony;
pub mod types;

pub use broadcast::{BroadcastHub, BroadcastReceiver, PendingResult, ReceiverContext, RegistrationId};
pub use error::{ExtractError, Result, SmsBackupError};
pub use logger::init_tracing;
pub use notifier::{Notifier, TracingNotifier};
pub use permissions::{PermissionGate, PresetPermissions};
pub use power::{PowerManager, ProcessPowerManager, TimedWakeLock, WakeLock};
pub use telephony::messages_from_intent;
pub use types::{
    ForegroundServiceType, Importance, Intent, IntentFilter, Notification, NotificationChannel,
    Permission, SmsFragment, ToastDuration, SMS_RECEIVED_ACTION,
};
