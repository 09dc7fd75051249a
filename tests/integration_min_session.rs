// Drives the compiled binary through a PTY so the real event loop and
// crossterm input handling are exercised end to end.
//
// Requires a TTY; expectrl allocates a pseudo terminal. Ignored by default.
// Run with: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_finishes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("mathdrill");
    let cmd = format!("{} -q 1 -d 1 -t 30", bin.display());

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    // start from the settings form, answer once, then finish
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("7")?;
    p.send("f")?;
    std::thread::sleep(Duration::from_millis(200));

    p.send("\x1b")?;
    p.expect(Eof)?;
    Ok(())
}
