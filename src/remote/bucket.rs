use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::TryStreamExt;
use object_store::path::Path;
use object_store::{parse_url, ObjectMeta, ObjectStore, PutMode, PutPayload};
use percent_encoding::percent_decode_str;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, warn};
use url::Url;

use super::{BlobStore, RemoteError};

/// Default deadline for a single remote request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `BlobStore` backed by any [`object_store`] backend (S3, local file
/// system, in-memory).
///
/// `object_store` is async; each request is driven to completion on a
/// private current-thread runtime and bounded by `timeout`.
pub struct BucketStore {
    store: Arc<dyn ObjectStore>,
    prefix: Path,
    timeout: Duration,
    runtime: Runtime,
}

impl fmt::Debug for BucketStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketStore")
            .field("store", &self.store.to_string())
            .field("prefix", &self.prefix)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BucketStore {
    /// Wrap an already-constructed object store. Keys are placed under `prefix`.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        prefix: Path,
        timeout: Duration,
    ) -> Result<BucketStore, RemoteError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| RemoteError::Permanent {
                key: prefix.to_string(),
                source: Box::new(err),
            })?;

        Ok(BucketStore {
            store,
            prefix,
            timeout,
            runtime,
        })
    }

    /// Open the bucket described by a URL such as `s3://bucket/prefix` or
    /// `file:///srv/codebase`.
    pub fn from_url(bucket: &str, timeout: Duration) -> Result<BucketStore, RemoteError> {
        let invalid = |reason: String| RemoteError::InvalidBucket {
            bucket: bucket.to_string(),
            reason,
        };

        let url = Url::parse(bucket).map_err(|e| invalid(e.to_string()))?;
        let (store, prefix) = parse_url(&url).map_err(|e| invalid(e.to_string()))?;

        BucketStore::new(Arc::from(store), prefix, timeout)
    }

    fn path(&self, key: &str) -> Path {
        key.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.prefix.clone(), |path, part| path.child(part))
    }

    // `PathPart`s are stored percent-encoded; keys handed out must be the
    // raw names so that `path` encodes them exactly once on the way back.
    fn key_of(&self, location: &Path) -> Option<String> {
        let parts = location
            .prefix_match(&self.prefix)?
            .map(|part| {
                percent_decode_str(part.as_ref())
                    .decode_utf8()
                    .ok()
                    .map(|decoded| decoded.into_owned())
            })
            .collect::<Option<Vec<String>>>();

        match parts {
            Some(parts) => Some(parts.join("/")),
            None => {
                warn!(location = %location, "ignoring remote object with undecodable name");
                None
            }
        }
    }

    fn run<F, T>(&self, key: &str, fut: F) -> Result<T, RemoteError>
    where
        F: Future<Output = object_store::Result<T>>,
    {
        let timeout = self.timeout;
        match self
            .runtime
            .block_on(async { tokio::time::timeout(timeout, fut).await })
        {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(classify(key, err)),
            Err(_elapsed) => Err(RemoteError::Timeout {
                key: key.to_string(),
                timeout,
            }),
        }
    }
}

impl BlobStore for BucketStore {
    fn list_objects(&self, prefix: &str) -> Result<Vec<String>, RemoteError> {
        let path = self.path(prefix);
        let metas: Vec<ObjectMeta> =
            self.run(prefix, async {
                self.store
                    .list(Some(&path))
                    .try_collect::<Vec<ObjectMeta>>()
                    .await
            })?;

        let keys: Vec<String> = metas
            .iter()
            .filter_map(|meta| self.key_of(&meta.location))
            .collect();

        debug!(prefix, count = keys.len(), "listed remote objects");
        Ok(keys)
    }

    fn get_object(&self, key: &str) -> Result<Vec<u8>, RemoteError> {
        let path = self.path(key);
        let bytes = self.run(key, async {
            match self.store.get(&path).await {
                Ok(result) => result.bytes().await,
                Err(err) => Err(err),
            }
        })?;

        debug!(key, bytes = bytes.len(), "downloaded object");
        Ok(bytes.to_vec())
    }

    fn put_object(&self, key: &str, content: Vec<u8>) -> Result<(), RemoteError> {
        let path = self.path(key);
        let len = content.len();
        let payload = PutPayload::from(content);

        let result = self.run(key, async {
            match self
                .store
                .put_opts(&path, payload, PutMode::Create.into())
                .await
            {
                Ok(_) => Ok(true),
                Err(object_store::Error::AlreadyExists { .. }) => Ok(false),
                Err(err) => Err(err),
            }
        })?;

        if result {
            debug!(key, bytes = len, "uploaded object");
        } else {
            debug!(key, "object already on remote");
        }
        Ok(())
    }
}

fn classify(key: &str, err: object_store::Error) -> RemoteError {
    // Network faults and throttling surface as `Generic` from the HTTP stores.
    let transient = matches!(
        err,
        object_store::Error::Generic { .. } | object_store::Error::JoinError { .. }
    );

    let key = key.to_string();
    let source = Box::new(err);
    if transient {
        RemoteError::Transient { key, source }
    } else {
        RemoteError::Permanent { key, source }
    }
}
