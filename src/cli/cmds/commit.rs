use std::io::Write;

use super::{App, Result};
use crate::find_repo;

use clap::{Arg, ArgMatches, SubCommand};

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("commit")
        .about("Snapshot the staged files into a new commit")
        .arg(
            Arg::with_name("message")
                .required(true)
                .empty_values(true)
                .help("Commit message"),
        )
}

pub(crate) fn run(app: &mut App, global: &ArgMatches, commit_matches: &ArgMatches) -> Result<()> {
    let message = commit_matches.value_of("message").unwrap_or("");

    let repo = find_repo::from_matches(global)?;
    let summary = repo.commit(message)?;

    writeln!(
        app,
        "Commit {} is created with the message {}",
        summary.id, summary.meta.message
    )?;

    Ok(())
}
