use std::fs;

use predicates::prelude::*;

mod common;
use common::{codebase_in, run_ok};

#[test]
fn push_then_pull_into_fresh_repo() {
    let bucket_dir = tempfile::tempdir().unwrap();
    let bucket = url::Url::from_directory_path(bucket_dir.path()).unwrap();

    let src_temp = tempfile::tempdir().unwrap();
    let src = src_temp.path();
    run_ok(src, &["init", "--bucket", bucket.as_str()]);

    fs::write(src.join("a.txt"), "one").unwrap();
    run_ok(src, &["add", "a.txt"]);
    run_ok(src, &["commit", "first"]);

    fs::write(src.join("b.txt"), "two").unwrap();
    run_ok(src, &["add", "b.txt"]);
    run_ok(src, &["commit", "second"]);

    codebase_in(src)
        .arg("push")
        .assert()
        .success()
        .stdout(format!("Pushed 2 commit(s) to {}\n", bucket));

    codebase_in(src)
        .arg("push")
        .assert()
        .success()
        .stdout(format!("Pushed 0 commit(s) to {}\n", bucket));

    let dst_temp = tempfile::tempdir().unwrap();
    let dst = dst_temp.path();
    run_ok(dst, &["init", "--bucket", bucket.as_str()]);

    codebase_in(dst)
        .args(&["pull", "--timeout", "10"])
        .assert()
        .success()
        .stdout(format!("Pulled 2 commit(s) from {}\n", bucket));

    assert_eq!(run_ok(dst, &["log"]), run_ok(src, &["log"]));
    assert!(!dir_diff::is_different(
        src.join(".codebase/Commits"),
        dst.join(".codebase/Commits")
    )
    .unwrap());

    codebase_in(dst)
        .arg("pull")
        .assert()
        .success()
        .stdout(format!("Pulled 0 commit(s) from {}\n", bucket));
}

#[test]
fn push_without_bucket_fails() {
    let temp = tempfile::tempdir().unwrap();
    let dir = temp.path();
    run_ok(dir, &["init"]);

    codebase_in(dir)
        .arg("push")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with(
            "ERROR: no remote bucket configured",
        ));
}

#[test]
fn pull_with_bad_bucket_fails() {
    let temp = tempfile::tempdir().unwrap();
    let dir = temp.path();
    run_ok(dir, &["init", "--bucket", "not a url"]);

    codebase_in(dir)
        .arg("pull")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid bucket"));
}
