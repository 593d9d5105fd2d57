//! Restoring working-directory files from a commit.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::commit::CommitId;
use crate::repo::{Error, IoResultExt, Result};
use crate::store::ContentStore;

/// Copy every file recorded in commit `id` into `work_dir`.
///
/// Files of the same name are overwritten. Files in `work_dir` that the
/// commit doesn't record are left alone: this is a restore, not a clean
/// checkout. The staging area is not touched.
///
/// Returns the number of files restored.
pub fn revert(store: &ContentStore, work_dir: &Path, id: &CommitId) -> Result<usize> {
    if !store.has_commit(id) {
        return Err(Error::CommitNotFound(*id));
    }

    // Read everything up front so a corrupt commit fails before any file
    // in the work dir is modified.
    let entries = store.read_commit_entries(id)?;

    for entry in &entries {
        let dest = work_dir.join(&entry.name);
        fs::write(&dest, &entry.content).at(&dest)?;

        debug!(name = %entry.name, dest = %dest.display(), "restored file");
    }

    info!(commit = %id, files = entries.len(), "reverted work dir");
    Ok(entries.len())
}
