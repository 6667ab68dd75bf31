pub mod background;
pub mod cooperative;

use std::fmt;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use serde::Deserialize;

use crate::runtime::Dispatcher;

pub use background::BackgroundMonitor;
pub use cooperative::CooperativeTimer;

/// Quiet period after which the text region is wiped
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// An idle window ran out. Carries the session generation it was armed under
/// so the controller can tell a live expiry from a stale one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expiry {
    pub generation: u64,
}

/// Debounce timer driving the controller.
///
/// All methods are called from the owning thread. Implementations either hand
/// due expiries back from [`InactivityTimer::poll`] or post them through a
/// [`Dispatcher`]; the controller treats both the same way.
pub trait InactivityTimer: fmt::Debug {
    /// Begin a fresh idle window for `generation`, replacing any pending one
    fn arm(&mut self, generation: u64, now: Instant);

    /// Drop the pending expiry, if any
    fn disarm(&mut self);

    /// Record a keypress in the running session
    fn on_activity(&mut self, generation: u64, now: Instant);

    /// Expiries that fell due on the owning thread
    fn poll(&mut self, now: Instant) -> Vec<Expiry>;

    /// When the pending expiry will fire, if the strategy knows
    fn deadline(&self) -> Option<Instant>;

    /// True while a background worker is still alive
    fn has_live_worker(&self) -> bool;
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// deferred calls pumped by the ui loop
    #[default]
    Cooperative,
    /// worker thread polling for activity
    Background,
}

impl Strategy {
    pub fn build(self, dispatcher: Dispatcher) -> Box<dyn InactivityTimer> {
        match self {
            Strategy::Cooperative => Box::new(CooperativeTimer::new(IDLE_TIMEOUT)),
            Strategy::Background => Box::new(BackgroundMonitor::new(IDLE_TIMEOUT, dispatcher)),
        }
    }
}
