use std::io::Write;

use super::{App, Result};
use crate::find_repo;

use clap::{Arg, ArgMatches, SubCommand};
use codebase::repo::{InitOutcome, Repo};

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("init")
        .about("Create an empty repository or reinitialize an existing one")
        .arg(
            Arg::with_name("bucket")
                .long("bucket")
                .value_name("url")
                .help("Remote bucket for push and pull (e.g. s3://bucket/prefix, file:///path)"),
        )
}

pub(crate) fn run(app: &mut App, global: &ArgMatches, init_matches: &ArgMatches) -> Result<()> {
    let work_dir = find_repo::work_dir(global)?;
    let bucket = init_matches.value_of("bucket");

    let (repo, outcome) = Repo::init(&work_dir, bucket)?;

    let verb = match outcome {
        InitOutcome::Created => "Initialized empty",
        InitOutcome::Reinitialized => "Reinitialized existing",
    };

    writeln!(app, "{} repository in {}", verb, repo.repo_dir().display())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::cmds::test_support::{fail_in, run_in};
    use crate::App;

    #[test]
    fn creates_repo() {
        let dir = tempfile::tempdir().unwrap();
        let stdout = run_in(dir.path(), &["init"]);

        let repo_dir = dir.path().join(".codebase");
        assert_eq!(
            stdout,
            format!("Initialized empty repository in {}\n", repo_dir.display())
        );
        assert!(repo_dir.join("Staging").is_dir());
        assert!(repo_dir.join("Commits").is_dir());
        assert!(repo_dir.join("config.json").is_file());
    }

    #[test]
    fn reinit_keeps_commits() {
        let dir = tempfile::tempdir().unwrap();
        run_in(dir.path(), &["init"]);
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        run_in(dir.path(), &["add", "a.txt"]);
        run_in(dir.path(), &["commit", "first"]);

        let stdout = run_in(dir.path(), &["init"]);
        assert!(stdout.starts_with("Reinitialized existing repository in "));

        let log = run_in(dir.path(), &["log"]);
        assert_eq!(log.lines().count(), 1);
    }

    #[test]
    fn records_bucket() {
        let dir = tempfile::tempdir().unwrap();
        run_in(dir.path(), &["init", "--bucket", "s3://my-bucket/repos"]);

        let config = fs::read_to_string(dir.path().join(".codebase/config.json")).unwrap();
        assert!(
            config.starts_with(r#"{"bucket":"s3://my-bucket/repos","created":""#),
            "{}",
            config
        );
    }

    #[test]
    fn error_missing_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let errmsg = fail_in(&dir.path().join("nope"), &["init"]);
        assert!(errmsg.contains("doesn't exist"), "{}", errmsg);
    }

    #[test]
    fn error_too_many_args() {
        let err = App::run_with_args(vec!["init", "here", "and there"]).unwrap_err();

        let errmsg = err.to_string();
        assert!(
            errmsg.contains("wasn't expected"),
            "\nincorrect error message:\n\n{}",
            errmsg
        );
    }
}
