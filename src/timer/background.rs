use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{Expiry, InactivityTimer};
use crate::runtime::Dispatcher;

/// Everything the owning thread and the worker share, behind one lock so that
/// worker exit, worker reuse and the idle decision never interleave.
#[derive(Debug, Default)]
struct MonitorState {
    running: bool,
    /// A worker is looping and will see the next change to `running`
    alive: bool,
    generation: u64,
    modified: bool,
    /// A clear was already requested for the current idle window
    cleared: bool,
}

impl MonitorState {
    fn touch(&mut self) {
        self.modified = true;
        self.cleared = false;
    }

    /// Read-and-reset on each worker wake. Yields the generation to clear
    /// when nothing was typed since the last wake.
    fn take_idle(&mut self) -> Option<u64> {
        let idle = !self.modified && !self.cleared;
        if idle {
            self.cleared = true;
        }
        self.modified = false;
        idle.then_some(self.generation)
    }
}

/// Worker thread that wakes every `interval`, checks whether anything was typed
/// since the last wake and, if not, posts a clear back to the owning thread.
///
/// The worker only notices `disarm` on its next wake, so shutdown latency is
/// bounded by one interval. The thread is detached: dropping the monitor (or
/// exiting the process) abandons it mid-sleep.
#[derive(Debug)]
pub struct BackgroundMonitor {
    interval: Duration,
    shared: Arc<Mutex<MonitorState>>,
    dispatcher: Dispatcher,
    worker: Option<JoinHandle<()>>,
}

impl BackgroundMonitor {
    pub fn new(interval: Duration, dispatcher: Dispatcher) -> Self {
        Self {
            interval,
            shared: Arc::new(Mutex::new(MonitorState::default())),
            dispatcher,
            worker: None,
        }
    }

    fn spawn_worker(&mut self) {
        let shared = Arc::clone(&self.shared);
        let dispatcher = self.dispatcher.clone();
        let interval = self.interval;

        let spawned = thread::Builder::new()
            .name("inactivity-monitor".into())
            .spawn(move || monitor_loop(shared, dispatcher, interval));

        match spawned {
            // A previous, already exited worker is simply detached
            Ok(handle) => self.worker = Some(handle),
            Err(e) => {
                // Without a worker the session just never clears
                warn!("failed to spawn inactivity monitor: {}", e);
                self.shared.lock().alive = false;
                self.worker = None;
            }
        }
    }
}

fn monitor_loop(shared: Arc<Mutex<MonitorState>>, dispatcher: Dispatcher, interval: Duration) {
    debug!("inactivity monitor started");

    loop {
        thread::sleep(interval);

        let request = {
            let mut state = shared.lock();
            if !state.running {
                state.alive = false;
                break;
            }
            state.take_idle()
        };

        if let Some(generation) = request {
            debug!(generation, "idle window elapsed, requesting clear");
            if !dispatcher.post(Expiry { generation }) {
                shared.lock().alive = false;
                break;
            }
        }
    }

    debug!("inactivity monitor exited");
}

impl InactivityTimer for BackgroundMonitor {
    fn arm(&mut self, generation: u64, _now: Instant) {
        let reuse = {
            let mut state = self.shared.lock();
            let reuse = state.alive;
            *state = MonitorState {
                running: true,
                alive: true,
                generation,
                ..MonitorState::default()
            };
            // A surviving worker is part way through a sleep; count the
            // remainder of it as activity so the new session gets a full window.
            if reuse {
                state.touch();
            }
            reuse
        };

        if !reuse {
            self.spawn_worker();
        }
    }

    fn disarm(&mut self) {
        self.shared.lock().running = false;
    }

    fn on_activity(&mut self, _generation: u64, _now: Instant) {
        self.shared.lock().touch();
    }

    fn poll(&mut self, _now: Instant) -> Vec<Expiry> {
        Vec::new()
    }

    fn deadline(&self) -> Option<Instant> {
        None
    }

    fn has_live_worker(&self) -> bool {
        self.shared.lock().alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::AppEvent;
    use assert_matches::assert_matches;
    use std::sync::mpsc::{self, RecvTimeoutError};

    const INTERVAL: Duration = Duration::from_millis(20);

    fn monitor() -> (BackgroundMonitor, mpsc::Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        (BackgroundMonitor::new(INTERVAL, Dispatcher::new(tx)), rx)
    }

    fn wait_for_exit(monitor: &BackgroundMonitor) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if !monitor.has_live_worker() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn idle_state_requests_one_clear_per_window() {
        let mut state = MonitorState {
            generation: 4,
            ..MonitorState::default()
        };
        assert_eq!(state.take_idle(), Some(4));
        assert_eq!(state.take_idle(), None);
        assert_eq!(state.take_idle(), None);

        state.touch();
        assert_eq!(state.take_idle(), None);
        assert_eq!(state.take_idle(), Some(4));
    }

    #[test]
    fn posts_clear_when_nothing_is_typed() {
        let (mut monitor, rx) = monitor();
        monitor.arm(3, Instant::now());

        assert_matches!(
            rx.recv_timeout(Duration::from_secs(2)),
            Ok(AppEvent::Expired(Expiry { generation: 3 }))
        );
        // Only once per idle window
        assert_matches!(
            rx.recv_timeout(INTERVAL * 5),
            Err(RecvTimeoutError::Timeout)
        );

        monitor.disarm();
        assert!(wait_for_exit(&monitor));
    }

    #[test]
    fn worker_exits_after_disarm() {
        let (mut monitor, _rx) = monitor();
        monitor.arm(1, Instant::now());
        assert!(monitor.has_live_worker());

        monitor.disarm();
        assert!(wait_for_exit(&monitor));
    }

    #[test]
    fn rearm_after_exit_spawns_a_fresh_worker() {
        let (mut monitor, rx) = monitor();
        monitor.arm(1, Instant::now());
        monitor.disarm();
        assert!(wait_for_exit(&monitor));
        while rx.try_recv().is_ok() {}

        monitor.arm(2, Instant::now());
        assert!(monitor.has_live_worker());
        assert_matches!(
            rx.recv_timeout(Duration::from_secs(2)),
            Ok(AppEvent::Expired(Expiry { generation: 2 }))
        );
        monitor.disarm();
        assert!(wait_for_exit(&monitor));
    }

    #[test]
    fn worker_stops_when_owning_loop_is_gone() {
        let (mut monitor, rx) = monitor();
        drop(rx);
        monitor.arm(1, Instant::now());

        assert!(wait_for_exit(&monitor));
    }

    #[test]
    fn restart_within_one_interval_reuses_worker_and_waits_a_full_window() {
        let interval = Duration::from_millis(200);
        let (tx, rx) = mpsc::channel();
        let mut monitor = BackgroundMonitor::new(interval, Dispatcher::new(tx));

        monitor.arm(1, Instant::now());
        let first = monitor.worker.as_ref().map(|h| h.thread().id());
        thread::sleep(Duration::from_millis(20));
        monitor.disarm();
        monitor.arm(2, Instant::now());
        assert_eq!(monitor.worker.as_ref().map(|h| h.thread().id()), first);

        // First wake lands inside the restarted window: nothing to clear yet
        assert_matches!(
            rx.recv_timeout(Duration::from_millis(250)),
            Err(RecvTimeoutError::Timeout)
        );
        assert_matches!(
            rx.recv_timeout(Duration::from_secs(2)),
            Ok(AppEvent::Expired(Expiry { generation: 2 }))
        );
        assert_matches!(
            rx.recv_timeout(interval * 2),
            Err(RecvTimeoutError::Timeout)
        );

        monitor.disarm();
        assert!(wait_for_exit(&monitor));
    }

    #[test]
    fn rapid_stop_start_never_orphans_a_running_session() {
        let (tx, rx) = mpsc::channel();
        let mut monitor = BackgroundMonitor::new(Duration::from_micros(300), Dispatcher::new(tx));

        for round in 0..300u64 {
            let generation = round * 2 + 1;
            monitor.arm(generation, Instant::now());
            thread::sleep(Duration::from_micros(round % 7 * 60));
            monitor.disarm();
            thread::sleep(Duration::from_micros(round % 5 * 80));
            monitor.arm(generation + 1, Instant::now());

            assert!(monitor.has_live_worker());

            // The restarted session still gets its clear, tagged with its own generation
            let deadline = Instant::now() + Duration::from_secs(2);
            let mut cleared = false;
            while let Some(left) = deadline.checked_duration_since(Instant::now()) {
                match rx.recv_timeout(left) {
                    Ok(AppEvent::Expired(Expiry { generation: g })) if g == generation + 1 => {
                        cleared = true;
                        break;
                    }
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
            assert!(cleared, "round {round}: restarted session was never cleared");

            monitor.disarm();
        }

        assert!(wait_for_exit(&monitor));
    }
}
