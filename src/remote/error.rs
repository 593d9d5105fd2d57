use std::time::Duration;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures talking to the remote blob store.
///
/// Remote failures never roll back or alter local commits; the local commit
/// archive is the source of truth and the remote is a mirror.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("no remote bucket configured (run `codebase init --bucket <url>`)")]
    NotConfigured,

    #[error("invalid bucket {bucket:?}: {reason}")]
    InvalidBucket { bucket: String, reason: String },

    #[error("remote request for {key} timed out after {timeout:?}")]
    Timeout { key: String, timeout: Duration },

    /// A failure that may succeed if retried (network trouble, throttling).
    #[error("remote request for {key} failed (transient): {source}")]
    Transient {
        key: String,
        #[source]
        source: BoxError,
    },

    /// A failure that will not go away by retrying (missing object, bad
    /// credentials, unsupported operation).
    #[error("remote request for {key} failed: {source}")]
    Permanent {
        key: String,
        #[source]
        source: BoxError,
    },
}

impl RemoteError {
    /// Returns true if retrying the same request might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RemoteError::Timeout { .. } | RemoteError::Transient { .. }
        )
    }
}
