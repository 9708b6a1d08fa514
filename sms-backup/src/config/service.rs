//! Service config: heartbeat, wake lock, permission and power-management behaviour.

use anyhow::{Context, Result};
use sms_core::Permission;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HEARTBEAT_INTERVAL_SECS
    pub heartbeat_interval_secs: u64,
    /// WAKE_LOCK_TIMEOUT_SECS: ceiling for one SMS event's background work
    pub wake_lock_timeout_secs: u64,
    /// DENIED_PERMISSIONS: comma list the permission gate refuses
    pub denied_permissions: Vec<Permission>,
    /// NOTIFICATION_PERMISSION_REQUIRED: whether posting notifications needs a runtime grant
    pub notification_permission_required: bool,
    /// BATTERY_OPTIMIZATION_EXEMPT
    pub battery_optimization_exempt: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 60,
            wake_lock_timeout_secs: 10,
            denied_permissions: Vec::new(),
            notification_permission_required: true,
            battery_optimization_exempt: false,
        }
    }
}

fn parse_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_secs(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default)
}

impl ServiceConfig {
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        let denied_permissions = match env::var("DENIED_PERMISSIONS") {
            Ok(list) => list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<Permission>().map_err(anyhow::Error::msg))
                .collect::<Result<Vec<_>>>()
                .context("DENIED_PERMISSIONS")?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            heartbeat_interval_secs: parse_secs(
                "HEARTBEAT_INTERVAL_SECS",
                defaults.heartbeat_interval_secs,
            ),
            wake_lock_timeout_secs: parse_secs(
                "WAKE_LOCK_TIMEOUT_SECS",
                defaults.wake_lock_timeout_secs,
            ),
            denied_permissions,
            notification_permission_required: parse_flag(
                "NOTIFICATION_PERMISSION_REQUIRED",
                defaults.notification_permission_required,
            ),
            battery_optimization_exempt: parse_flag(
                "BATTERY_OPTIMIZATION_EXEMPT",
                defaults.battery_optimization_exempt,
            ),
        })
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn wake_lock_timeout(&self) -> Duration {
        Duration::from_secs(self.wake_lock_timeout_secs)
    }
}
