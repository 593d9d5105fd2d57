//! Represents a local repository: a working directory plus the `.codebase`
//! directory holding its staging area and commit archive.
//!
//! `Repo` is a thin handle over the components that do the work:
//!
//! * [`crate::store`] owns the on-disk layout,
//! * [`crate::staging`] stages files,
//! * [`crate::commit`] turns the staging area into commits,
//! * [`crate::revert`] restores files from a commit,
//! * [`crate::remote`] mirrors commits to a blob store.
//!
//! Exactly one repository directory exists per working directory, always
//! named `.codebase`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{SubsecRound, Utc};
use tracing::{debug, info};

mod config;
pub use config::{Config, CONFIG_FILE};

mod error;
pub use error::{Error, Result};
pub(crate) use error::IoResultExt;

use crate::commit::{self, Commit, CommitId, CommitMeta, CommitSummary};
use crate::entry_name::EntryName;
use crate::remote::{self, BlobStore, BucketStore, RemoteError};
use crate::revert;
use crate::staging;
use crate::store::ContentStore;

/// Name of the repository directory inside the working directory.
pub const REPO_DIR_NAME: &str = ".codebase";

/// Handle to an initialized repository.
#[derive(Debug)]
pub struct Repo {
    work_dir: PathBuf,
    store: ContentStore,
    config: Config,
}

/// Whether `Repo::init` created a repository or found one already there.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InitOutcome {
    Created,
    Reinitialized,
}

impl Repo {
    /// Open the repository whose working directory is `work_dir`.
    ///
    /// The `.codebase` directory must already exist; use `init` to create it.
    pub fn open<P: AsRef<Path>>(work_dir: P) -> Result<Repo> {
        let work_dir = work_dir.as_ref().to_path_buf();
        if !work_dir.is_dir() {
            return Err(Error::WorkDirDoesntExist(work_dir));
        }

        let repo_dir = work_dir.join(REPO_DIR_NAME);
        if !repo_dir.is_dir() {
            return Err(Error::RepoDirDoesntExist(repo_dir));
        }

        let config = Config::load(&repo_dir)?;

        Ok(Repo {
            work_dir,
            store: ContentStore::new(repo_dir),
            config,
        })
    }

    /// Create a repository in `work_dir`, or repair an existing one.
    ///
    /// Running `init` on an existing repository never removes commits or
    /// staged files; it only recreates missing directories. The config is
    /// rewritten only when `bucket` is given (or when there is no config yet).
    pub fn init<P: AsRef<Path>>(work_dir: P, bucket: Option<&str>) -> Result<(Repo, InitOutcome)> {
        let work_dir = work_dir.as_ref().to_path_buf();
        if !work_dir.is_dir() {
            return Err(Error::WorkDirDoesntExist(work_dir));
        }

        let repo_dir = work_dir.join(REPO_DIR_NAME);
        let outcome = if repo_dir.exists() {
            InitOutcome::Reinitialized
        } else {
            InitOutcome::Created
        };

        let store = ContentStore::new(&repo_dir);
        store.ensure_root()?;

        let mut config = Config::load(&repo_dir)?;
        let first_init = !repo_dir.join(CONFIG_FILE).exists();
        if first_init {
            config.created = Some(Utc::now().trunc_subsecs(3));
        }
        if bucket.is_some() || first_init {
            if let Some(bucket) = bucket {
                config.bucket = Some(bucket.to_string());
            }
            config.save(&repo_dir)?;
        }

        info!(repo = %repo_dir.display(), ?outcome, "initialized repository");

        Ok((
            Repo {
                work_dir,
                store,
                config,
            },
            outcome,
        ))
    }

    /// Return the working directory for this repo.
    pub fn work_dir(&self) -> &Path {
        self.work_dir.as_path()
    }

    /// Return the path to the `.codebase` directory.
    pub fn repo_dir(&self) -> &Path {
        self.store.repo_dir()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Stage the file at `path`. Relative paths resolve against the working
    /// directory.
    pub fn add<P: AsRef<Path>>(&self, path: P) -> Result<EntryName> {
        let path = self.work_dir.join(path);
        staging::add(&self.store, &path)
    }

    /// Names of all staged files, sorted.
    pub fn status(&self) -> Result<Vec<EntryName>> {
        staging::status(&self.store)
    }

    /// Snapshot the staging area into a new commit.
    pub fn commit(&self, message: &str) -> Result<CommitSummary> {
        commit::commit(&self.store, message)
    }

    /// Every commit, oldest first.
    pub fn log(&self) -> Result<Vec<(CommitId, CommitMeta)>> {
        commit::log(&self.store)
    }

    /// Load commit `id` with all of its files.
    pub fn read_commit(&self, id: &CommitId) -> Result<Commit> {
        Commit::read(&self.store, id)
    }

    /// Look up a commit by the ID string a user typed.
    ///
    /// A string that isn't a valid commit ID can't name any commit and is
    /// reported as not found.
    pub fn resolve_commit(&self, id: &str) -> Result<CommitId> {
        let parsed = CommitId::parse(id).map_err(|err| {
            debug!(id, %err, "not a commit id");
            Error::UnknownCommit(id.to_string())
        })?;

        if !self.store.has_commit(&parsed) {
            return Err(Error::CommitNotFound(parsed));
        }
        Ok(parsed)
    }

    /// Restore the files of commit `id` into the working directory.
    pub fn revert(&self, id: &CommitId) -> Result<usize> {
        revert::revert(&self.store, &self.work_dir, id)
    }

    /// Open the configured remote bucket.
    pub fn remote(&self, timeout: Duration) -> Result<BucketStore> {
        let bucket = self
            .config
            .bucket
            .as_deref()
            .ok_or(RemoteError::NotConfigured)?;
        Ok(BucketStore::from_url(bucket, timeout)?)
    }

    /// Upload local commits missing from `remote`.
    pub fn push(&self, remote: &dyn BlobStore) -> Result<Vec<CommitId>> {
        remote::push(&self.store, remote)
    }

    /// Download remote commits missing locally.
    pub fn pull(&self, remote: &dyn BlobStore) -> Result<Vec<CommitId>> {
        remote::pull(&self.store, remote)
    }
}
