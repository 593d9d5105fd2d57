use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

/// An error which can be returned when parsing a commit ID.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ParseCommitIdError {
    /// Value being parsed is empty.
    #[error("cannot parse commit ID from empty string")]
    Empty,

    /// Value is not a hyphenated UUID.
    #[error("value is not a valid commit ID")]
    Malformed,

    /// Value is a UUID but not in canonical lowercase hyphenated form.
    ///
    /// Commit IDs double as directory names and remote keys, so two spellings
    /// of the same ID must never both be accepted.
    #[error("commit ID must be lowercase and hyphenated")]
    NotCanonical,

    /// Value was the nil UUID.
    #[error("ID would be zero")]
    Zero,
}

/// A commit ID uniquely identifies a commit within a repository and its remote.
///
/// IDs are random (UUID version 4) so that independent repositories never need
/// to coordinate to avoid collisions. The canonical text form is 36 lowercase
/// hex digits and hyphens.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CommitId {
    id: Uuid,
}

impl CommitId {
    /// Generate a fresh, random commit ID.
    pub fn generate() -> CommitId {
        CommitId { id: Uuid::new_v4() }
    }

    /// Parse the canonical text form of a commit ID.
    pub fn parse<T: AsRef<str>>(id: T) -> Result<CommitId, ParseCommitIdError> {
        let s = id.as_ref();
        if s.is_empty() {
            return Err(ParseCommitIdError::Empty);
        }

        let id = Uuid::try_parse(s).map_err(|_| ParseCommitIdError::Malformed)?;
        if id.is_nil() {
            return Err(ParseCommitIdError::Zero);
        }

        let id = CommitId { id };
        if id.to_string() != s {
            return Err(ParseCommitIdError::NotCanonical);
        }

        Ok(id)
    }
}

impl FromStr for CommitId {
    type Err = ParseCommitIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommitId::parse(s)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id.as_hyphenated())
    }
}
