// Minimal integration test that drives the compiled binary through a PTY.
// This exercises the real event loop and crossterm input handling across
// the main boundaries without relying on internal modules.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Marked Unix-only and ignored by default to avoid CI/platform issues.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_starts_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("blankpage");
    let cmd = format!("{} --strategy background", bin.display());

    let mut p = spawn(cmd)?;

    // Give the app a moment to initialize the terminal/alternate screen
    std::thread::sleep(Duration::from_millis(200));

    // F5 starts a session, then type a little
    p.send("\x1b[15~")?;
    p.send("hi")?;
    std::thread::sleep(Duration::from_millis(200));

    // ESC requests close; the worker exits on its next wake (within 5s)
    p.send("\x1b")?;

    p.expect(Eof)?;
    Ok(())
}

#[test]
fn refuses_to_run_without_a_tty() {
    assert_cmd::Command::cargo_bin("blankpage")
        .unwrap()
        .write_stdin("")
        .assert()
        .failure();
}
