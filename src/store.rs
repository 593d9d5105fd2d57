//! Durable storage for staged files and committed snapshots.
//!
//! Everything lives under the repository directory (`.codebase`):
//!
//! ```text
//! .codebase/
//!   config.json
//!   Staging/              flat directory of staged files
//!   Commits/<commit id>/  one directory per commit
//!     commit.json
//!     <staged files, verbatim>
//!   tmp/                  scratch space for atomic writes
//! ```
//!
//! Nothing is cached in memory. Every write lands in `tmp/` first and is
//! moved into place with a single rename, so readers never observe a
//! half-written staged file or commit.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::commit::{CommitId, CommitMeta, COMMIT_META_FILE};
use crate::entry_name::EntryName;
use crate::repo::{Error, IoResultExt, Result};

pub const STAGING_DIR: &str = "Staging";
pub const COMMITS_DIR: &str = "Commits";
pub const TMP_DIR: &str = "tmp";

/// A named file and its full content, as staged or as recorded in a commit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    pub name: EntryName,
    pub content: Vec<u8>,
}

/// File-system layout of one repository directory.
#[derive(Clone, Debug)]
pub struct ContentStore {
    repo_dir: PathBuf,
}

impl ContentStore {
    pub fn new<P: Into<PathBuf>>(repo_dir: P) -> ContentStore {
        ContentStore {
            repo_dir: repo_dir.into(),
        }
    }

    pub fn repo_dir(&self) -> &Path {
        self.repo_dir.as_path()
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.repo_dir.join(STAGING_DIR)
    }

    pub fn commits_dir(&self) -> PathBuf {
        self.repo_dir.join(COMMITS_DIR)
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.repo_dir.join(TMP_DIR)
    }

    pub fn commit_dir(&self, id: &CommitId) -> PathBuf {
        self.commits_dir().join(id.to_string())
    }

    /// Create the repository directory and its subdirectories if missing.
    ///
    /// Idempotent: existing content (notably existing commits) is never
    /// touched. Fails if the repository directory exists but is read-only.
    pub fn ensure_root(&self) -> Result<()> {
        if self.repo_dir.exists() {
            let metadata = fs::metadata(&self.repo_dir).at(&self.repo_dir)?;
            if !metadata.is_dir() {
                return Err(io::Error::new(io::ErrorKind::AlreadyExists, "not a directory"))
                    .at(&self.repo_dir);
            }
            if metadata.permissions().readonly() {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "repository directory is not writable",
                ))
                .at(&self.repo_dir);
            }
        }

        for dir in &[self.staging_dir(), self.commits_dir(), self.tmp_dir()] {
            fs::create_dir_all(dir).at(dir)?;
        }

        Ok(())
    }

    /// Store `content` in the staging area under `name`.
    ///
    /// Silently replaces any content previously staged under the same name.
    pub fn write_staged(&self, name: &EntryName, content: &[u8]) -> Result<()> {
        let tmp_dir = self.tmp_dir();
        let mut temp = tempfile::Builder::new()
            .prefix("staged-")
            .tempfile_in(&tmp_dir)
            .at(&tmp_dir)?;

        temp.write_all(content).at(temp.path())?;
        temp.as_file().sync_all().at(temp.path())?;

        let dest = self.staging_dir().join(name);
        temp.persist(&dest).map_err(|e| e.error).at(&dest)?;

        debug!(name = %name, bytes = content.len(), "staged file");
        Ok(())
    }

    /// Names of all currently staged files, sorted.
    pub fn staged_names(&self) -> Result<Vec<EntryName>> {
        list_entry_names(&self.staging_dir(), None)
    }

    /// Snapshot of every staged entry with its content, sorted by name.
    pub fn read_all_staged(&self) -> Result<Vec<Entry>> {
        read_entries(&self.staging_dir(), None)
    }

    /// Remove the named entries from the staging area.
    ///
    /// Entries that have already disappeared are ignored. Every name is
    /// attempted; the first failure is returned.
    pub fn remove_staged(&self, names: &[EntryName]) -> Result<()> {
        let staging_dir = self.staging_dir();
        let mut first_err = None;

        for name in names {
            let path = staging_dir.join(name);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    debug!(path = %path.display(), %err, "failed to remove staged file");
                    first_err.get_or_insert(Error::IoErrorAt { path, source: err });
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Persist `entries` and `meta` as the new commit `id`.
    ///
    /// The commit is assembled in a scratch directory and renamed into the
    /// commit archive in one step. On any failure the scratch directory is
    /// removed and the archive is unchanged.
    pub fn materialize_commit(
        &self,
        id: &CommitId,
        meta: &CommitMeta,
        entries: &[Entry],
    ) -> Result<()> {
        let dest = self.commit_dir(id);
        if dest.exists() {
            return Err(Error::CommitExists(*id));
        }

        let tmp_dir = self.tmp_dir();
        let temp = tempfile::Builder::new()
            .prefix("commit-")
            .tempdir_in(&tmp_dir)
            .at(&tmp_dir)?;

        for entry in entries {
            write_synced(&temp.path().join(&entry.name), &entry.content)?;
        }

        let meta_json = meta.to_json().map_err(io::Error::from)?;
        write_synced(&temp.path().join(COMMIT_META_FILE), &meta_json)?;

        if dest.exists() {
            return Err(Error::CommitExists(*id));
        }

        // After a successful rename `temp` points at nothing and its drop is a no-op.
        fs::rename(temp.path(), &dest).at(&dest)?;

        debug!(commit = %id, files = entries.len(), "materialized commit");
        Ok(())
    }

    pub fn has_commit(&self, id: &CommitId) -> bool {
        self.commit_dir(id).join(COMMIT_META_FILE).is_file()
    }

    /// IDs of every commit in the archive, sorted.
    ///
    /// Directories that aren't named by a valid commit ID are skipped.
    pub fn commit_ids(&self) -> Result<Vec<CommitId>> {
        let commits_dir = self.commits_dir();
        let mut ids = Vec::new();

        for dir_entry in fs::read_dir(&commits_dir).at(&commits_dir)? {
            let dir_entry = dir_entry.at(&commits_dir)?;
            let name = dir_entry.file_name();
            let parsed = name.to_str().map(CommitId::parse);

            match parsed {
                Some(Ok(id)) if dir_entry.path().is_dir() => ids.push(id),
                _ => warn!(
                    entry = %dir_entry.path().display(),
                    "ignoring unexpected entry in commit archive"
                ),
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Read the `commit.json` metadata of commit `id`.
    pub fn read_commit_meta(&self, id: &CommitId) -> Result<CommitMeta> {
        let dir = self.commit_dir(id);
        if !dir.is_dir() {
            return Err(Error::CommitNotFound(*id));
        }

        let meta_path = dir.join(COMMIT_META_FILE);
        let bytes = fs::read(&meta_path).at(&meta_path)?;
        CommitMeta::from_json(&bytes).map_err(|source| Error::CorruptCommit { id: *id, source })
    }

    /// Every file recorded in commit `id` with its content, sorted by name.
    pub fn read_commit_entries(&self, id: &CommitId) -> Result<Vec<Entry>> {
        let dir = self.commit_dir(id);
        if !dir.is_dir() {
            return Err(Error::CommitNotFound(*id));
        }

        read_entries(&dir, Some(COMMIT_META_FILE))
    }
}

fn write_synced(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).at(path)?;
    file.write_all(content).at(path)?;
    file.sync_all().at(path)
}

fn list_entry_names(dir: &Path, skip: Option<&str>) -> Result<Vec<EntryName>> {
    let mut names = Vec::new();

    for dir_entry in fs::read_dir(dir).at(dir)? {
        let dir_entry = dir_entry.at(dir)?;
        let file_name = dir_entry.file_name();

        if skip.map_or(false, |s| file_name == s) {
            continue;
        }

        if !dir_entry.file_type().at(dir_entry.path())?.is_file() {
            warn!(entry = %dir_entry.path().display(), "ignoring non-file entry");
            continue;
        }

        match EntryName::from_os_str(&file_name) {
            Ok(name) => names.push(name),
            Err(reason) => warn!(
                entry = %dir_entry.path().display(),
                %reason,
                "ignoring entry with invalid name"
            ),
        }
    }

    names.sort();
    Ok(names)
}

fn read_entries(dir: &Path, skip: Option<&str>) -> Result<Vec<Entry>> {
    list_entry_names(dir, skip)?
        .into_iter()
        .map(|name| -> Result<Entry> {
            let path = dir.join(&name);
            let content = fs::read(&path).at(&path)?;
            Ok(Entry { name, content })
        })
        .collect()
}
