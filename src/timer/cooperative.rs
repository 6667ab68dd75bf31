use std::time::{Duration, Instant};

use tracing::debug;

use super::{Expiry, InactivityTimer};
use crate::scheduler::{Scheduler, TimerHandle};

/// Debounce timer on top of the loop-pumped [`Scheduler`].
///
/// Keeps at most one live handle: every re-arm cancels the previous one first.
#[derive(Debug)]
pub struct CooperativeTimer {
    timeout: Duration,
    scheduler: Scheduler<Expiry>,
    handle: Option<TimerHandle>,
}

impl CooperativeTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            scheduler: Scheduler::new(),
            handle: None,
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.handle.take() {
            if self.scheduler.cancel(handle) {
                debug!(?handle, "cancelled pending expiry");
            }
        }
    }
}

impl InactivityTimer for CooperativeTimer {
    fn arm(&mut self, generation: u64, now: Instant) {
        self.cancel_pending();
        let handle = self
            .scheduler
            .arm(now, self.timeout, Expiry { generation });
        debug!(?handle, generation, "armed expiry");
        self.handle = Some(handle);
    }

    fn disarm(&mut self) {
        self.cancel_pending();
    }

    fn on_activity(&mut self, generation: u64, now: Instant) {
        self.arm(generation, now);
    }

    fn poll(&mut self, now: Instant) -> Vec<Expiry> {
        let fired = self.scheduler.fire_due(now);
        if fired.iter().any(|(h, _)| Some(*h) == self.handle) {
            self.handle = None;
        }
        fired.into_iter().map(|(_, expiry)| expiry).collect()
    }

    fn deadline(&self) -> Option<Instant> {
        self.handle.and_then(|h| self.scheduler.deadline(h))
    }

    fn has_live_worker(&self) -> bool {
        false
    }
}
