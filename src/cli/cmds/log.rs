use std::io::Write;

use super::{App, Result};
use crate::find_repo;

use clap::{ArgMatches, SubCommand};

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("log").about("List commits, oldest first")
}

pub(crate) fn run(app: &mut App, global: &ArgMatches, _log_matches: &ArgMatches) -> Result<()> {
    let repo = find_repo::from_matches(global)?;

    for (id, meta) in repo.log()? {
        writeln!(app, "{} {} {}", id, meta.date_string(), meta.message)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::cmds::test_support::{init_with_file, run_in};

    #[test]
    fn empty_repo() {
        let dir = tempfile::tempdir().unwrap();
        run_in(dir.path(), &["init"]);

        assert_eq!(run_in(dir.path(), &["log"]), "");
    }

    #[test]
    fn oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        init_with_file(dir.path(), "a.txt", "v1");
        run_in(dir.path(), &["add", "a.txt"]);
        run_in(dir.path(), &["commit", "one"]);

        fs::write(dir.path().join("a.txt"), "v2").unwrap();
        run_in(dir.path(), &["add", "a.txt"]);
        run_in(dir.path(), &["commit", "two"]);

        let stdout = run_in(dir.path(), &["log"]);
        let messages: Vec<&str> = stdout
            .lines()
            .map(|line| line.splitn(3, ' ').nth(2).unwrap())
            .collect();
        assert_eq!(messages, vec!["one", "two"]);
    }
}
