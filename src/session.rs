use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub running: bool,
    /// Bumped on every start, stop and close; expiries armed under an older
    /// generation are stale
    pub generation: u64,
    pub started_at: Option<Instant>,
    pub clears: usize,
}

impl SessionState {
    pub fn begin(&mut self, now: Instant) -> u64 {
        self.generation += 1;
        self.running = true;
        self.started_at = Some(now);
        self.clears = 0;
        self.generation
    }

    pub fn end(&mut self) {
        self.generation += 1;
        self.running = false;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.running && self.generation == generation
    }
}
