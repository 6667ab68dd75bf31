use std::time::Instant;

use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::editor::TextRegion;
use crate::input::{map_key, map_mouse, Command};
use crate::runtime::AppEvent;
use crate::session::SessionState;
use crate::timer::{Expiry, InactivityTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    /// Close requested, waiting for the background worker to notice
    Closing,
    Closed,
}

/// Owns the session, the text region and the inactivity timer.
///
/// Every method runs on the thread that owns the terminal.
#[derive(Debug)]
pub struct WriterBlockApp {
    pub session: SessionState,
    pub editor: TextRegion,
    timer: Box<dyn InactivityTimer>,
    phase: Phase,
}

impl WriterBlockApp {
    pub fn new(timer: Box<dyn InactivityTimer>) -> Self {
        Self {
            session: SessionState::default(),
            editor: TextRegion::new(),
            timer,
            phase: Phase::Open,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.session.running
    }

    /// When the pending clear will fire, if the timer can tell
    pub fn deadline(&self) -> Option<Instant> {
        if self.session.running {
            self.timer.deadline()
        } else {
            None
        }
    }

    pub fn start(&mut self, now: Instant) {
        if self.phase != Phase::Open {
            return;
        }
        self.editor.set_editable(true);
        self.editor.clear();
        let generation = self.session.begin(now);
        self.timer.arm(generation, now);
        info!(generation, "session started");
    }

    pub fn stop(&mut self) {
        self.timer.disarm();
        self.session.end();
        self.editor.set_editable(false);
        info!(clears = self.session.clears, "session stopped");
    }

    /// Returns true if the key changed or moved within the text
    pub fn on_keypress(&mut self, key: KeyEvent, now: Instant) -> bool {
        if !self.session.running {
            return false;
        }
        self.timer.on_activity(self.session.generation, now);
        self.editor.apply_key(key)
    }

    /// Clears the region if `expiry` belongs to the running session
    pub fn on_expiry(&mut self, expiry: Expiry) -> bool {
        if !self.session.is_current(expiry.generation) {
            debug!(
                expiry.generation,
                current = self.session.generation,
                "dropping stale expiry"
            );
            return false;
        }
        self.editor.clear();
        self.session.clears += 1;
        debug!(clears = self.session.clears, "cleared after inactivity");
        true
    }

    pub fn on_tick(&mut self, now: Instant) {
        for expiry in self.timer.poll(now) {
            self.on_expiry(expiry);
        }
        if self.phase == Phase::Closing && !self.timer.has_live_worker() {
            info!("monitor quiesced, closing");
            self.phase = Phase::Closed;
        }
    }

    /// Returns the phase after the request. A second request while already
    /// closing abandons the worker.
    pub fn request_close(&mut self) -> Phase {
        match self.phase {
            Phase::Open => {
                if self.session.running {
                    self.stop();
                }
                self.phase = if self.timer.has_live_worker() {
                    info!("close requested, waiting for monitor to exit");
                    Phase::Closing
                } else {
                    Phase::Closed
                };
            }
            Phase::Closing => {
                warn!("monitor still alive, abandoning it");
                self.phase = Phase::Closed;
            }
            Phase::Closed => {}
        }
        self.phase
    }

    pub fn handle_event(&mut self, event: AppEvent, now: Instant, area: Rect) -> Flow {
        match event {
            AppEvent::Tick => self.on_tick(now),
            AppEvent::Resize => {}
            AppEvent::Expired(expiry) => {
                self.on_expiry(expiry);
            }
            AppEvent::Key(key) => self.apply(map_key(key), now),
            AppEvent::Mouse(mouse) => {
                if let Some(cmd) = map_mouse(mouse, area) {
                    self.apply(cmd, now);
                }
            }
        }

        if self.phase == Phase::Closed {
            Flow::Quit
        } else {
            Flow::Continue
        }
    }

    fn apply(&mut self, cmd: Command, now: Instant) {
        // Once closing, only another close gets through
        if self.phase != Phase::Open && cmd != Command::Close {
            return;
        }
        match cmd {
            Command::Start => self.start(now),
            Command::Stop => self.stop(),
            Command::Close => {
                self.request_close();
            }
            Command::Edit(key) => {
                self.on_keypress(key, now);
            }
        }
    }
}
