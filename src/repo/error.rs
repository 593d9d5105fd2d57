use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::commit::CommitId;
use crate::entry_name::EntryNameError;
use crate::remote::RemoteError;

/// Describes the potential error conditions that might arise from `Repo` operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    IoError(#[from] io::Error),

    #[error("{path}: {source}")]
    IoErrorAt {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("repository not found at {0} (run `codebase init` first)")]
    RepoDirDoesntExist(PathBuf),

    #[error("work directory {0} doesn't exist")]
    WorkDirDoesntExist(PathBuf),

    #[error("{0} does not exist or is not a readable file")]
    NotFound(PathBuf),

    #[error("commit {0} does not exist")]
    CommitNotFound(CommitId),

    /// A commit named by a string that isn't a valid commit ID, so no such
    /// commit can exist.
    #[error("commit {0} does not exist")]
    UnknownCommit(String),

    #[error("nothing to commit: the staging area is empty")]
    EmptyCommit,

    #[error("commit {0} already exists")]
    CommitExists(CommitId),

    #[error("{0} is inside the repository directory")]
    SourceInsideRepo(PathBuf),

    #[error("can't stage {name:?}: {reason}")]
    InvalidEntryName {
        name: String,
        #[source]
        reason: EntryNameError,
    },

    #[error(
        "repository is locked by {} ({path} exists); delete the lock file if that process is no longer running",
        lock_holder(.pid)
    )]
    Locked { path: PathBuf, pid: Option<u32> },

    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("commit {id} has unreadable metadata: {source}")]
    CorruptCommit {
        id: CommitId,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

fn lock_holder(pid: &Option<u32>) -> String {
    match pid {
        Some(pid) => format!("process {}", pid),
        None => "an unknown process".to_string(),
    }
}

/// A specialized `Result` type for `Repo` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Attaches the offending path to a bare `io::Error`.
pub(crate) trait IoResultExt<T> {
    fn at<P: AsRef<Path>>(self, path: P) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at<P: AsRef<Path>>(self, path: P) -> Result<T> {
        self.map_err(|source| Error::IoErrorAt {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}
