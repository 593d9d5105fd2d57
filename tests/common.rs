use std::path::Path;

use assert_cmd::Command;

// Build a `codebase` command rooted at `dir`. Logging is silenced so stderr
// holds only the error line.
pub fn codebase_in(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("codebase").unwrap();
    cmd.current_dir(dir).env("RUST_LOG", "off");
    cmd
}

// Run a command that must succeed and return its stdout.
#[allow(dead_code)]
pub fn run_ok(dir: &Path, args: &[&str]) -> String {
    let output = codebase_in(dir).args(args).assert().success();
    String::from_utf8(output.get_output().stdout.clone()).unwrap()
}

// Pull the commit id out of `commit`'s output line.
#[allow(dead_code)]
pub fn commit_id(stdout: &str) -> String {
    stdout.split_whitespace().nth(1).unwrap().to_string()
}
