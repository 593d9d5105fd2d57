use std::time::Duration;

use clap::{value_t, Arg, ArgMatches};

use codebase::remote::DEFAULT_TIMEOUT;

use crate::{App, Result};

mod add;
mod commit;
mod init;
mod log;
mod pull;
mod push;
mod revert;
mod status;

pub(crate) fn add_subcommands<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
    app.subcommand(add::subcommand())
        .subcommand(commit::subcommand())
        .subcommand(init::subcommand())
        .subcommand(log::subcommand())
        .subcommand(pull::subcommand())
        .subcommand(push::subcommand())
        .subcommand(revert::subcommand())
        .subcommand(status::subcommand())
}

pub(crate) fn dispatch(app: &mut App) -> Result<()> {
    let matches = app.arg_matches.clone();
    // ^^ Ugh. Need an independent copy of matches so we can still pass
    // the App struct through to subcommand imps.

    match matches.subcommand() {
        ("add", Some(m)) => add::run(app, &matches, &m),
        ("commit", Some(m)) => commit::run(app, &matches, &m),
        ("init", Some(m)) => init::run(app, &matches, &m),
        ("log", Some(m)) => log::run(app, &matches, &m),
        ("pull", Some(m)) => pull::run(app, &matches, &m),
        ("push", Some(m)) => push::run(app, &matches, &m),
        ("revert", Some(m)) => revert::run(app, &matches, &m),
        ("status", Some(m)) => status::run(app, &matches, &m),
        _ => unreachable!(),
        // unreachable: Should have exited out with appropriate help or
        // error message if no subcommand was given.
    }
}

// Shared by `push` and `pull`.
fn timeout_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("timeout")
        .long("timeout")
        .value_name("secs")
        .help("Give up on a single remote request after this many seconds [default: 30]")
}

fn remote_timeout(matches: &ArgMatches) -> Result<Duration> {
    if matches.is_present("timeout") {
        let secs = value_t!(matches, "timeout", u64)?;
        Ok(Duration::from_secs(secs))
    } else {
        Ok(DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::Path;

    use crate::App;

    // Run the CLI against `dir` and return stdout as a string.
    // Panics if the command fails.
    pub fn run_in(dir: &Path, args: &[&str]) -> String {
        let mut full_args = vec!["-C", dir.to_str().unwrap()];
        full_args.extend_from_slice(args);

        let stdout = App::run_with_args(full_args).unwrap();
        String::from_utf8(stdout).unwrap()
    }

    // Run the CLI against `dir` and return the error message.
    // Panics if the command succeeds.
    pub fn fail_in(dir: &Path, args: &[&str]) -> String {
        let mut full_args = vec!["-C", dir.to_str().unwrap()];
        full_args.extend_from_slice(args);

        App::run_with_args(full_args).unwrap_err().to_string()
    }

    pub fn init_with_file(dir: &Path, name: &str, content: &str) {
        run_in(dir, &["init"]);
        fs::write(dir.join(name), content).unwrap();
    }
}
