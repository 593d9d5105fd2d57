use std::fmt;

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::commit::COMMIT_META_FILE;
use crate::repo::REPO_DIR_NAME;

/// A file name that may be stored in the staging area and inside a commit.
///
/// Staged files are flat: an entry name is always a single path segment
/// (the base name of the file that was added).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EntryName(String);

/// Reasons why a given string can not be accepted as an entry name.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum EntryNameError {
    #[error("name is empty")]
    Empty,

    #[error("name is `.` or `..`")]
    DotOrDotDot,

    #[error("name contains a path separator")]
    ContainsSeparator,

    #[error("name contains a null byte")]
    ContainsNull,

    #[error("name is not valid UTF-8")]
    NotUtf8,

    #[error("name is reserved for repository metadata")]
    Reserved,
}

const RESERVED_NAMES: [&str; 2] = [COMMIT_META_FILE, REPO_DIR_NAME];

impl EntryName {
    /// Convert the provided string to an `EntryName` if it is acceptable
    /// as a staged file name.
    pub fn new<S: Into<String>>(name: S) -> Result<EntryName, EntryNameError> {
        let name = name.into();
        check_name(&name)?;
        Ok(EntryName(name))
    }

    /// Convert raw (possibly non-UTF-8) file name bytes to an `EntryName`.
    pub fn from_os_str(name: &std::ffi::OsStr) -> Result<EntryName, EntryNameError> {
        match name.to_str() {
            Some(s) => EntryName::new(s),
            None => Err(EntryNameError::NotUtf8),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for EntryName {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn check_name(name: &str) -> Result<(), EntryNameError> {
    if name.is_empty() {
        Err(EntryNameError::Empty)
    } else if name == "." || name == ".." {
        Err(EntryNameError::DotOrDotDot)
    } else if name.contains('\0') {
        Err(EntryNameError::ContainsNull)
    } else if name.contains('/') || name.contains('\\') {
        Err(EntryNameError::ContainsSeparator)
    } else if is_reserved(name) {
        Err(EntryNameError::Reserved)
    } else {
        Ok(())
    }
}

// Case-insensitive file systems (and HFS+, which also drops a handful of
// invisible code points) would let `Commit.JSON` clobber commit metadata.
fn is_reserved(name: &str) -> bool {
    let folded: String = name
        .chars()
        .filter(|c| !is_hfs_ignorable(*c))
        .collect::<String>()
        .to_lowercase()
        .nfc()
        .collect();

    RESERVED_NAMES.iter().any(|r| folded == *r)
}

fn is_hfs_ignorable(c: char) -> bool {
    matches!(
        c,
        '\u{200C}'
            | '\u{200D}'
            | '\u{200E}'
            | '\u{200F}'
            | '\u{202A}'
            | '\u{202B}'
            | '\u{202C}'
            | '\u{202D}'
            | '\u{202E}'
            | '\u{206A}'
            | '\u{206B}'
            | '\u{206C}'
            | '\u{206D}'
            | '\u{206E}'
            | '\u{206F}'
            | '\u{FEFF}'
    )
}
