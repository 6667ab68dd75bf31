// Library surface for headless/integration tests and reuse.
// The binary in main.rs only owns terminal setup and the draw loop.
pub mod config;
pub mod controller;
pub mod editor;
pub mod error;
pub mod input;
pub mod logging;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod timer;
pub mod ui;

pub use controller::WriterBlockApp;

/// Event loop tick. Also the interval at which a pending close re-checks the monitor.
pub const TICK_RATE_MS: u64 = 100;
