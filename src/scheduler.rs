use std::time::{Duration, Instant};

/// Opaque reference to a deferred call armed on a [`Scheduler`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    handle: TimerHandle,
    deadline: Instant,
    payload: T,
}

/// Single-threaded deferred-call facility pumped by the owning event loop.
///
/// Nothing fires on its own: the loop calls [`Scheduler::fire_due`] with the
/// current instant and receives every payload whose deadline has passed.
/// A cancelled handle never comes back out of `fire_due`.
#[derive(Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn arm(&mut self, now: Instant, delay: Duration, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            handle,
            deadline: now + delay,
            payload,
        });
        handle
    }

    /// Returns false if the handle already fired or was cancelled
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    #[cfg(test)]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn deadline(&self, handle: TimerHandle) -> Option<Instant> {
        self.pending
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| p.deadline)
    }

    #[cfg(test)]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    /// Removes and returns every entry due at `now`, earliest deadline first.
    /// Entries sharing a deadline come out in arming order.
    pub fn fire_due(&mut self, now: Instant) -> Vec<(TimerHandle, T)> {
        let (mut due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.deadline <= now);
        self.pending = rest;

        due.sort_by_key(|p| (p.deadline, p.handle));
        due.into_iter().map(|p| (p.handle, p.payload)).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_fires_before_deadline() {
        let t0 = Instant::now();
        let mut sched = Scheduler::new();
        sched.arm(t0, Duration::from_secs(5), "clear");

        assert!(sched.fire_due(t0 + Duration::from_millis(4999)).is_empty());
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn fires_once_at_deadline() {
        let t0 = Instant::now();
        let mut sched = Scheduler::new();
        let h = sched.arm(t0, Duration::from_secs(5), "clear");

        let fired = sched.fire_due(t0 + Duration::from_secs(5));
        assert_eq!(fired, vec![(h, "clear")]);
        assert!(sched.fire_due(t0 + Duration::from_secs(60)).is_empty());
        assert!(!sched.is_pending(h));
    }

    #[test]
    fn cancelled_handle_never_fires() {
        let t0 = Instant::now();
        let mut sched = Scheduler::new();
        let h = sched.arm(t0, Duration::from_secs(1), 1);

        assert!(sched.cancel(h));
        assert!(!sched.cancel(h));
        assert!(sched.fire_due(t0 + Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn due_entries_come_out_in_deadline_order() {
        let t0 = Instant::now();
        let mut sched = Scheduler::new();
        let late = sched.arm(t0, Duration::from_secs(3), 'c');
        let early = sched.arm(t0, Duration::from_secs(1), 'a');
        let tie = sched.arm(t0, Duration::from_secs(1), 'b');

        let fired = sched.fire_due(t0 + Duration::from_secs(3));
        assert_eq!(fired, vec![(early, 'a'), (tie, 'b'), (late, 'c')]);
    }

    #[test]
    fn next_deadline_tracks_remaining_entries() {
        let t0 = Instant::now();
        let mut sched = Scheduler::new();
        let a = sched.arm(t0, Duration::from_secs(2), ());
        sched.arm(t0, Duration::from_secs(4), ());

        assert_eq!(sched.next_deadline(), Some(t0 + Duration::from_secs(2)));
        assert_eq!(sched.deadline(a), Some(t0 + Duration::from_secs(2)));
        sched.cancel(a);
        assert_eq!(sched.next_deadline(), Some(t0 + Duration::from_secs(4)));
    }
}
