use std::io::Write;

use super::{App, Result};
use crate::find_repo;

use clap::{Arg, ArgMatches, SubCommand};

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("revert")
        .about("Restore the files of a commit into the working directory")
        .arg(
            Arg::with_name("commitID")
                .required(true)
                .help("The commit to restore"),
        )
}

pub(crate) fn run(app: &mut App, global: &ArgMatches, revert_matches: &ArgMatches) -> Result<()> {
    let id_str = revert_matches.value_of("commitID").unwrap();
    // unwrap: clap has already enforced that "commitID" is present.

    let repo = find_repo::from_matches(global)?;
    let id = repo.resolve_commit(id_str)?;
    repo.revert(&id)?;

    writeln!(app, "Commit {} reverted successfully", id)?;

    Ok(())
}
