use std::io::Write;

use super::{App, Result};
use crate::find_repo;

use clap::{ArgMatches, SubCommand};

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("status").about("List the files in the staging area")
}

pub(crate) fn run(app: &mut App, global: &ArgMatches, _status_matches: &ArgMatches) -> Result<()> {
    let repo = find_repo::from_matches(global)?;

    for name in repo.status()? {
        writeln!(app, "{}", name)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::cmds::test_support::{init_with_file, run_in};

    #[test]
    fn lists_staged_names() {
        let dir = tempfile::tempdir().unwrap();
        init_with_file(dir.path(), "b.txt", "bee");
        fs::write(dir.path().join("a.txt"), "ay").unwrap();

        assert_eq!(run_in(dir.path(), &["status"]), "");

        run_in(dir.path(), &["add", "b.txt"]);
        run_in(dir.path(), &["add", "a.txt"]);
        assert_eq!(run_in(dir.path(), &["status"]), "a.txt\nb.txt\n");

        run_in(dir.path(), &["commit", "both"]);
        assert_eq!(run_in(dir.path(), &["status"]), "");
    }
}
