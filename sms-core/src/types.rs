//! Core types: intents and filters, SMS fragments, permissions, notifications.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Action broadcast by the telephony stack when a new SMS arrives.
pub const SMS_RECEIVED_ACTION: &str = "android.provider.Telephony.SMS_RECEIVED";

/// A broadcast event: an action name plus free-form extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub action: String,
    #[serde(default)]
    pub extras: Map<String, Value>,
}

impl Intent {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            extras: Map::new(),
        }
    }

    /// Builds an SMS-received intent carrying the given fragments under `pdus`.
    pub fn sms_received(fragments: &[SmsFragment]) -> Self {
        let pdus = fragments
            .iter()
            .map(|f| serde_json::to_value(f).unwrap_or(Value::Null))
            .collect();
        Self::new(SMS_RECEIVED_ACTION).with_extra("pdus", Value::Array(pdus))
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }
}

/// Which intents a receiver wants, and how early it sees them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentFilter {
    pub action: String,
    /// Higher priority receivers are dispatched first.
    pub priority: i32,
}

impl IntentFilter {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn matches(&self, intent: &Intent) -> bool {
        self.action == intent.action
    }
}

/// One part of a possibly multi-part SMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsFragment {
    #[serde(default)]
    pub display_originating_address: Option<String>,
    #[serde(default)]
    pub display_message_body: Option<String>,
    #[serde(default)]
    pub message_body: Option<String>,
    pub timestamp_millis: i64,
}

impl SmsFragment {
    pub fn new(sender: &str, body: &str, timestamp_millis: i64) -> Self {
        Self {
            display_originating_address: Some(sender.to_string()),
            display_message_body: Some(body.to_string()),
            message_body: Some(body.to_string()),
            timestamp_millis,
        }
    }

    /// Originating address, `"Unknown"` when absent.
    pub fn sender(&self) -> String {
        self.display_originating_address
            .clone()
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Display body, then raw body, then empty.
    pub fn body(&self) -> String {
        self.display_message_body
            .clone()
            .or_else(|| self.message_body.clone())
            .unwrap_or_default()
    }
}

/// Runtime authorizations the backup needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permission {
    ReadSms,
    ReceiveSms,
    ReadPhoneState,
    PostNotifications,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ReadSms => "android.permission.READ_SMS",
            Permission::ReceiveSms => "android.permission.RECEIVE_SMS",
            Permission::ReadPhoneState => "android.permission.READ_PHONE_STATE",
            Permission::PostNotifications => "android.permission.POST_NOTIFICATIONS",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    /// Accepts both the short (`READ_SMS`) and the fully qualified name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let short = s.trim().trim_start_matches("android.permission.");
        match short.to_ascii_uppercase().as_str() {
            "READ_SMS" => Ok(Permission::ReadSms),
            "RECEIVE_SMS" => Ok(Permission::ReceiveSms),
            "READ_PHONE_STATE" => Ok(Permission::ReadPhoneState),
            "POST_NOTIFICATIONS" => Ok(Permission::PostNotifications),
            other => Err(format!("unknown permission: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Low,
    Default,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub importance: Importance,
}

impl NotificationChannel {
    pub fn new(id: &str, name: &str, importance: Importance) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            importance,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel_id: String,
    pub title: String,
    pub text: String,
    pub auto_cancel: bool,
}

impl Notification {
    pub fn new(channel_id: &str, title: &str, text: &str) -> Self {
        Self {
            channel_id: channel_id.to_string(),
            title: title.to_string(),
            text: text.to_string(),
            auto_cancel: false,
        }
    }

    pub fn auto_cancel(mut self, auto_cancel: bool) -> Self {
        self.auto_cancel = auto_cancel;
        self
    }
}

/// Background classification a foreground service declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForegroundServiceType {
    DataSync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastDuration {
    Short,
    Long,
}
