//! Broadcast dispatch: receivers register with an [`IntentFilter`], intents are delivered in
//! descending priority order, and receivers that need to outlive `on_receive` take a
//! [`PendingResult`] grace-period token.

use crate::types::{Intent, IntentFilter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Receives broadcasts. `on_receive` runs on the dispatching thread and must not block;
/// long work goes to a spawned task holding a [`PendingResult`].
pub trait BroadcastReceiver: Send + Sync {
    fn on_receive(&self, ctx: &ReceiverContext, intent: &Intent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u64);

struct Registration {
    id: RegistrationId,
    filter: IntentFilter,
    receiver: Arc<dyn BroadcastReceiver>,
}

/// Handed to a receiver for the duration of one `on_receive` call.
pub struct ReceiverContext {
    pending: Arc<watch::Sender<usize>>,
    grace_period: Duration,
}

impl ReceiverContext {
    /// Extends the broadcast past `on_receive`. The hub counts the token as outstanding until
    /// it is finished or dropped.
    pub fn go_async(&self) -> PendingResult {
        self.pending.send_modify(|n| *n += 1);
        PendingResult {
            pending: self.pending.clone(),
            acquired: Instant::now(),
            grace_period: self.grace_period,
            finished: false,
        }
    }
}

/// Grace-period token. Finished exactly once, by [`PendingResult::finish`] or on drop.
pub struct PendingResult {
    pending: Arc<watch::Sender<usize>>,
    acquired: Instant,
    grace_period: Duration,
    finished: bool,
}

impl PendingResult {
    pub fn finish(mut self) {
        self.complete();
    }

    fn complete(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let elapsed = self.acquired.elapsed();
        if elapsed > self.grace_period {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                grace_ms = self.grace_period.as_millis() as u64,
                "Broadcast finished after its grace period"
            );
        }
        self.pending.send_modify(|n| *n = n.saturating_sub(1));
    }
}

impl Drop for PendingResult {
    fn drop(&mut self) {
        self.complete();
    }
}

/// In-process stand-in for the platform broadcast dispatcher.
pub struct BroadcastHub {
    registrations: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
    pending: Arc<watch::Sender<usize>>,
    grace_period: Duration,
}

impl BroadcastHub {
    pub fn new(grace_period: Duration) -> Self {
        let (tx, _rx) = watch::channel(0usize);
        Self {
            registrations: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            pending: Arc::new(tx),
            grace_period,
        }
    }

    pub fn register(
        &self,
        receiver: Arc<dyn BroadcastReceiver>,
        filter: IntentFilter,
    ) -> RegistrationId {
        let id = RegistrationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        info!(
            action = %filter.action,
            priority = filter.priority,
            registration = id.0,
            "Receiver registered"
        );
        match self.registrations.write() {
            Ok(mut regs) => regs.push(Registration {
                id,
                filter,
                receiver,
            }),
            Err(poisoned) => poisoned.into_inner().push(Registration {
                id,
                filter,
                receiver,
            }),
        }
        id
    }

    /// Returns false when `id` was not registered.
    pub fn unregister(&self, id: RegistrationId) -> bool {
        let mut regs = match self.registrations.write() {
            Ok(regs) => regs,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = regs.len();
        regs.retain(|r| r.id != id);
        let removed = regs.len() != before;
        if removed {
            info!(registration = id.0, "Receiver unregistered");
        }
        removed
    }

    pub fn is_registered(&self, id: RegistrationId) -> bool {
        self.registrations
            .read()
            .map(|regs| regs.iter().any(|r| r.id == id))
            .unwrap_or(false)
    }

    /// Delivers `intent` to every matching receiver, highest priority first (registration
    /// order among equals). A panicking receiver is logged and does not stop delivery.
    /// Returns the number of receivers invoked.
    pub fn send_broadcast(&self, intent: &Intent) -> usize {
        let mut targets: Vec<(i32, Arc<dyn BroadcastReceiver>)> = match self.registrations.read() {
            Ok(regs) => regs
                .iter()
                .filter(|r| r.filter.matches(intent))
                .map(|r| (r.filter.priority, r.receiver.clone()))
                .collect(),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .filter(|r| r.filter.matches(intent))
                .map(|r| (r.filter.priority, r.receiver.clone()))
                .collect(),
        };
        targets.sort_by(|a, b| b.0.cmp(&a.0));

        debug!(action = %intent.action, receivers = targets.len(), "Dispatching broadcast");

        let ctx = ReceiverContext {
            pending: self.pending.clone(),
            grace_period: self.grace_period,
        };
        for (_, receiver) in &targets {
            let result = catch_unwind(AssertUnwindSafe(|| receiver.on_receive(&ctx, intent)));
            if result.is_err() {
                error!(action = %intent.action, "Receiver panicked in on_receive");
            }
        }
        targets.len()
    }

    /// Number of grace-period tokens not yet finished.
    pub fn pending_count(&self) -> usize {
        *self.pending.borrow()
    }

    /// Waits until every outstanding token is finished. Returns false on timeout.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let mut rx = self.pending.subscribe();
        let idle = tokio::time::timeout(timeout, async {
            rx.wait_for(|n| *n == 0).await.map(|_| ()).is_ok()
        })
        .await;
        idle.unwrap_or(false)
    }
}
