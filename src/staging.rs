//! The staging area: files added but not yet committed.

use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

use crate::entry_name::EntryName;
use crate::lock::RepoLock;
use crate::repo::{Error, IoResultExt, Result};
use crate::store::ContentStore;

/// Copy the file at `source` into the staging area under its base name.
///
/// Only content is recorded; file mode and timestamps are not. The source
/// file is left untouched. Staging a name that is already staged replaces
/// the earlier content.
///
/// Holds the repository lock while writing, so a staged entry can't be
/// replaced between a commit's snapshot and its clearing of the staging area.
pub fn add(store: &ContentStore, source: &Path) -> Result<EntryName> {
    let metadata = match fs::metadata(source) {
        Ok(m) => m,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(Error::NotFound(source.to_path_buf()));
        }
        Err(err) => return Err(err).at(source),
    };

    if !metadata.is_file() {
        return Err(Error::NotFound(source.to_path_buf()));
    }

    if is_inside(source, store.repo_dir())? {
        return Err(Error::SourceInsideRepo(source.to_path_buf()));
    }

    let file_name = source
        .file_name()
        .ok_or_else(|| Error::NotFound(source.to_path_buf()))?;

    let name = EntryName::from_os_str(file_name).map_err(|reason| Error::InvalidEntryName {
        name: file_name.to_string_lossy().into_owned(),
        reason,
    })?;

    let content = fs::read(source).at(source)?;

    let _lock = RepoLock::acquire(store.repo_dir())?;
    store.write_staged(&name, &content)?;

    info!(name = %name, source = %source.display(), "staged file");
    Ok(name)
}

/// Names of all staged files, sorted.
pub fn status(store: &ContentStore) -> Result<Vec<EntryName>> {
    store.staged_names()
}

fn is_inside(path: &Path, dir: &Path) -> Result<bool> {
    if !dir.exists() {
        return Ok(false);
    }

    let path = path.canonicalize().at(path)?;
    let dir = dir.canonicalize().at(dir)?;
    Ok(path.starts_with(dir))
}
