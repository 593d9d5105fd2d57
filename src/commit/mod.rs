//! Commits: immutable, uniquely identified snapshots of the staging area.

use tracing::{info, warn};

use crate::lock::RepoLock;
use crate::repo::{Error, Result};
use crate::store::{ContentStore, Entry};

mod id;
pub use id::{CommitId, ParseCommitIdError};

mod meta;
pub use meta::{CommitMeta, COMMIT_META_FILE};

/// A commit read back from the archive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Commit {
    pub id: CommitId,
    pub meta: CommitMeta,
    pub entries: Vec<Entry>,
}

impl Commit {
    /// Load commit `id` with all of its files.
    pub fn read(store: &ContentStore, id: &CommitId) -> Result<Commit> {
        let meta = store.read_commit_meta(id)?;
        let entries = store.read_commit_entries(id)?;
        Ok(Commit {
            id: *id,
            meta,
            entries,
        })
    }
}

/// What a successful commit reports back to the caller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommitSummary {
    pub id: CommitId,
    pub meta: CommitMeta,
    pub files: usize,
}

/// Snapshot everything currently staged into a new commit and clear the
/// staging area.
///
/// The staging area is only cleared once the commit is fully on disk. If
/// writing the commit fails, staging is untouched so the same commit can be
/// retried. Once the commit is on disk it is reported as created even if
/// clearing the staging area fails; the leftover entries are logged.
pub fn commit(store: &ContentStore, message: &str) -> Result<CommitSummary> {
    let _lock = RepoLock::acquire(store.repo_dir())?;

    let entries = store.read_all_staged()?;
    if entries.is_empty() {
        return Err(Error::EmptyCommit);
    }

    let id = CommitId::generate();
    let meta = CommitMeta::now(message);

    store.materialize_commit(&id, &meta, &entries)?;

    unstage(store, &entries);

    info!(commit = %id, files = entries.len(), "created commit");

    Ok(CommitSummary {
        id,
        meta,
        files: entries.len(),
    })
}

// Entries left behind stay staged and would be recorded again by the next
// commit, which is harmless; failing here would invite a duplicate commit.
fn unstage(store: &ContentStore, entries: &[Entry]) {
    let names: Vec<_> = entries.iter().map(|e| e.name.clone()).collect();
    if let Err(err) = store.remove_staged(&names) {
        warn!(%err, "commit recorded but the staging area could not be cleared");
    }
}

/// Every commit in the archive, oldest first.
///
/// Commits with equal timestamps are ordered by ID.
pub fn log(store: &ContentStore) -> Result<Vec<(CommitId, CommitMeta)>> {
    let mut commits = store
        .commit_ids()?
        .into_iter()
        .map(|id| -> Result<_> { Ok((id, store.read_commit_meta(&id)?)) })
        .collect::<Result<Vec<_>>>()?;

    commits.sort_by(|a, b| a.1.date.cmp(&b.1.date).then(a.0.cmp(&b.0)));
    Ok(commits)
}
