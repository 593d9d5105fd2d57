use std::io::Write;

use super::{App, Result};
use crate::{cmds::remote_timeout, find_repo};

use clap::{ArgMatches, SubCommand};

pub(crate) fn subcommand<'a, 'b>() -> clap::App<'a, 'b> {
    SubCommand::with_name("push")
        .about("Upload local commits missing from the remote bucket")
        .arg(super::timeout_arg())
}

pub(crate) fn run(app: &mut App, global: &ArgMatches, push_matches: &ArgMatches) -> Result<()> {
    let timeout = remote_timeout(push_matches)?;

    let repo = find_repo::from_matches(global)?;
    let remote = repo.remote(timeout)?;
    let pushed = repo.push(&remote)?;

    let bucket = repo.config().bucket.as_deref().unwrap_or_default();
    writeln!(app, "Pushed {} commit(s) to {}", pushed.len(), bucket)?;

    Ok(())
}
