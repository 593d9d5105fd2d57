use std::{
    env,
    path::{Path, PathBuf},
};

use clap::ArgMatches;

use codebase::{Repo, Result};

// Resolve the working directory for a command: the `-C <path>` option if
// given, otherwise the current working directory.
pub fn work_dir(matches: &ArgMatches) -> Result<PathBuf> {
    match matches.value_of("C") {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(env::current_dir()?),
    }
}

// Open the repository rooted at the given working directory.
//
// Only the given directory is considered. Parent directories are not
// searched for a `.codebase` directory.
pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Repo> {
    Repo::open(path)
}

// Open the repository for the working directory selected by `matches`.
pub fn from_matches(matches: &ArgMatches) -> Result<Repo> {
    from_path(work_dir(matches)?)
}
