use std::io::Write;

use super::{App, Result};
use crate::{cmds::remote_timeout, find_repo};

use clap::{ArgMatches, SubCommand};

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("pull")
        .about("Download remote commits missing from the local repository")
        .arg(super::timeout_arg())
}

pub(crate) fn run(app: &mut App, global: &ArgMatches, pull_matches: &ArgMatches) -> Result<()> {
    let timeout = remote_timeout(pull_matches)?;

    let repo = find_repo::from_matches(global)?;
    let remote = repo.remote(timeout)?;
    let pulled = repo.pull(&remote)?;

    let bucket = repo.config().bucket.as_deref().unwrap_or_default();
    writeln!(app, "Pulled {} commit(s) from {}", pulled.len(), bucket)?;

    Ok(())
}
