//! Shared test utilities for integration tests
//!
//! Provides log fixtures with known byte layouts and a command builder that
//! keeps state inside the fixture directory.

#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::prelude::*;

/// Bytes per fixture line, newline included.
pub const LINE_BYTES: usize = 30;

/// Fixture line `i` without its newline (29 bytes).
pub fn fixture_line(i: usize) -> String
{
    format!("line {i:05} {}", "x".repeat(18))
}

/// `lines` fixed-width lines. With `terminated = false` the final newline
/// is replaced by `!`, leaving the size unchanged.
pub fn fixed_width_log(
    lines: usize,
    terminated: bool,
) -> String
{
    let mut text = String::with_capacity(lines * LINE_BYTES);
    for i in 0..lines
    {
        text.push_str(&fixture_line(i));
        text.push('\n');
    }
    if !terminated
    {
        text.pop();
        text.push('!');
    }
    text
}

/// A small mixed-severity log in a temp directory as `app.log`.
pub fn make_log_fixture() -> assert_fs::TempDir
{
    // Initialize the temporary project root
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    tmp.child("app.log")
        .write_str("boot info ok\nwarn disk\nERROR db down\n")
        .expect("write app.log");

    tmp
}

/// `lw` running inside `dir` with its state kept in `dir/state`.
pub fn lw(dir: &assert_fs::TempDir) -> Command
{
    let mut cmd = Command::cargo_bin("lw").expect("bin");
    cmd.current_dir(dir.path())
        .arg("--state-dir")
        .arg(dir.path().join("state"))
        .env_remove("LOGWARP_LOG");
    cmd
}
