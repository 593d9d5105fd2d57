//! Mirroring local commits to and from a remote blob store.
//!
//! ## Remote layout
//!
//! Every file of commit `<id>` is stored as one object keyed
//! `commits/<id>/<file name>`, including its `commit.json`. The metadata
//! object is always uploaded last, so a remote commit counts as present only
//! once `commits/<id>/commit.json` exists. An interrupted push therefore
//! leaves an incomplete remote commit that the next push finishes and that
//! `pull` ignores.
//!
//! Remote objects are write-once: the same key always holds the same
//! content, which makes `push` safe to repeat.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::commit::{Commit, CommitId, CommitMeta, COMMIT_META_FILE};
use crate::entry_name::EntryName;
use crate::lock::RepoLock;
use crate::repo::Result;
use crate::store::{ContentStore, Entry};

mod bucket;
pub use bucket::{BucketStore, DEFAULT_TIMEOUT};

mod error;
pub use error::{BoxError, RemoteError};

/// Key prefix under which all commits are stored remotely.
pub const REMOTE_PREFIX: &str = "commits";

/// A remote blob store holding opaque objects addressed by string keys.
///
/// Implementations must treat `put_object` as write-once: storing to a key
/// that already exists succeeds and leaves the existing object in place.
pub trait BlobStore {
    /// Keys of every object whose key starts with `prefix`.
    fn list_objects(&self, prefix: &str) -> std::result::Result<Vec<String>, RemoteError>;

    fn get_object(&self, key: &str) -> std::result::Result<Vec<u8>, RemoteError>;

    fn put_object(&self, key: &str, content: Vec<u8>) -> std::result::Result<(), RemoteError>;
}

/// Remote key for file `name` of commit `id`.
pub fn object_key(id: &CommitId, name: &str) -> String {
    format!("{}/{}/{}", REMOTE_PREFIX, id, name)
}

/// Upload every local commit that isn't complete on the remote.
///
/// Returns the IDs of the commits uploaded, in ID order. Local state is
/// never modified.
pub fn push(store: &ContentStore, remote: &dyn BlobStore) -> Result<Vec<CommitId>> {
    let index = remote_index(remote)?;
    let mut pushed = Vec::new();

    for id in store.commit_ids()? {
        if index.get(&id).map_or(false, |r| r.is_complete()) {
            continue;
        }

        let commit = Commit::read(store, &id)?;
        for entry in &commit.entries {
            remote.put_object(&object_key(&id, entry.name.as_str()), entry.content.clone())?;
        }

        let meta_json = commit.meta.to_json().map_err(std::io::Error::from)?;
        remote.put_object(&object_key(&id, COMMIT_META_FILE), meta_json)?;

        info!(commit = %id, files = commit.entries.len(), "pushed commit");
        pushed.push(id);
    }

    Ok(pushed)
}

/// Download every complete remote commit that doesn't exist locally.
///
/// Remote commits holding an object whose name isn't a valid entry name
/// are skipped entirely.
///
/// Each commit is assembled off to the side and moved into the archive in
/// one step, so a failure part way through leaves no partial commit behind.
/// Existing local commits are never overwritten. Returns the IDs of the
/// commits downloaded, in ID order.
pub fn pull(store: &ContentStore, remote: &dyn BlobStore) -> Result<Vec<CommitId>> {
    let _lock = RepoLock::acquire(store.repo_dir())?;

    let index = remote_index(remote)?;
    let mut pulled = Vec::new();

    for (id, remote_commit) in index {
        if store.commit_dir(&id).exists() {
            continue;
        }

        if !remote_commit.is_complete() {
            warn!(commit = %id, "skipping incomplete remote commit");
            continue;
        }

        if remote_commit.has_invalid_names {
            warn!(commit = %id, "skipping remote commit with invalid file names");
            continue;
        }

        let meta_bytes = remote.get_object(&object_key(&id, COMMIT_META_FILE))?;
        let meta = match CommitMeta::from_json(&meta_bytes) {
            Ok(meta) => meta,
            Err(err) => {
                warn!(commit = %id, %err, "skipping remote commit with unreadable metadata");
                continue;
            }
        };

        let mut entries = Vec::new();
        for name in remote_commit.files {
            let content = remote.get_object(&object_key(&id, name.as_str()))?;
            entries.push(Entry { name, content });
        }

        store.materialize_commit(&id, &meta, &entries)?;

        info!(commit = %id, files = entries.len(), "pulled commit");
        pulled.push(id);
    }

    Ok(pulled)
}

#[derive(Debug, Default)]
struct RemoteCommit {
    files: BTreeSet<EntryName>,
    has_meta: bool,
    // A commit can't be reproduced locally with a file missing, so one bad
    // name disqualifies the whole commit.
    has_invalid_names: bool,
}

impl RemoteCommit {
    fn is_complete(&self) -> bool {
        self.has_meta
    }
}

fn remote_index(remote: &dyn BlobStore) -> Result<BTreeMap<CommitId, RemoteCommit>> {
    let mut index: BTreeMap<CommitId, RemoteCommit> = BTreeMap::new();
    let prefix = format!("{}/", REMOTE_PREFIX);

    for key in remote.list_objects(REMOTE_PREFIX)? {
        let rest = match key.strip_prefix(&prefix) {
            Some(rest) => rest,
            None => continue,
        };

        let mut parts = rest.splitn(2, '/');
        let (id, name) = match (parts.next(), parts.next()) {
            (Some(id), Some(name)) => (id, name),
            _ => {
                warn!(key = %key, "ignoring unexpected remote object");
                continue;
            }
        };

        let id = match CommitId::parse(id) {
            Ok(id) => id,
            Err(err) => {
                warn!(key = %key, %err, "ignoring remote object with invalid commit id");
                continue;
            }
        };

        let commit = index.entry(id).or_default();
        if name == COMMIT_META_FILE {
            commit.has_meta = true;
            continue;
        }

        match EntryName::new(name) {
            Ok(name) => {
                commit.files.insert(name);
            }
            Err(err) => {
                warn!(key = %key, %err, "remote object has an invalid file name");
                commit.has_invalid_names = true;
            }
        }
    }

    Ok(index)
}
