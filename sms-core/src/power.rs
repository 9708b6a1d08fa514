//! Power management: time-boxed wake locks and battery-optimization exemption.

use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Keeps the device awake until released or until the acquire timeout elapses.
pub trait WakeLock: Send {
    /// Acquires the lock; it lapses by itself after `timeout`.
    fn acquire(&mut self, timeout: Duration);
    fn is_held(&self) -> bool;
    fn release(&mut self);
}

pub trait PowerManager: Send + Sync {
    fn new_wake_lock(&self, tag: &str) -> Box<dyn WakeLock>;
    fn is_ignoring_battery_optimizations(&self) -> bool;
    /// Asks the user to exempt the app from power saving. The answer is not reported back.
    fn request_ignore_battery_optimizations(&self);
}

/// In-process wake lock: held from `acquire` until `release` or its deadline.
pub struct TimedWakeLock {
    tag: String,
    deadline: Option<Instant>,
}

impl TimedWakeLock {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            deadline: None,
        }
    }
}

impl WakeLock for TimedWakeLock {
    fn acquire(&mut self, timeout: Duration) {
        debug!(tag = %self.tag, timeout_ms = timeout.as_millis() as u64, "Wake lock acquired");
        self.deadline = Some(Instant::now() + timeout);
    }

    fn is_held(&self) -> bool {
        self.deadline.map_or(false, |d| Instant::now() < d)
    }

    fn release(&mut self) {
        if self.deadline.take().is_some() {
            debug!(tag = %self.tag, "Wake lock released");
        }
    }
}

/// [`PowerManager`] for a process without an OS power service.
pub struct ProcessPowerManager {
    ignoring_battery_optimizations: bool,
}

impl ProcessPowerManager {
    pub fn new(ignoring_battery_optimizations: bool) -> Self {
        Self {
            ignoring_battery_optimizations,
        }
    }
}

impl PowerManager for ProcessPowerManager {
    fn new_wake_lock(&self, tag: &str) -> Box<dyn WakeLock> {
        Box::new(TimedWakeLock::new(tag))
    }

    fn is_ignoring_battery_optimizations(&self) -> bool {
        self.ignoring_battery_optimizations
    }

    fn request_ignore_battery_optimizations(&self) {
        info!("Requesting exemption from battery optimizations");
    }
}
