use std::io::Write;

use super::{App, Result};
use crate::find_repo;

use clap::{Arg, ArgMatches, SubCommand};

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("add")
        .about("Add a file to the staging area")
        .arg(
            Arg::with_name("file")
                .required(true)
                .help("File to add to the staging area"),
        )
}

pub(crate) fn run(app: &mut App, global: &ArgMatches, add_matches: &ArgMatches) -> Result<()> {
    let file = add_matches.value_of("file").unwrap();
    // unwrap: clap has already enforced that "file" is present.

    let repo = find_repo::from_matches(global)?;
    let name = repo.add(file)?;

    writeln!(app, "File {} has been added to the staging area", name)?;

    Ok(())
}
