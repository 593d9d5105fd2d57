//! A small local version-control core: stage files, snapshot them into
//! immutable commits, restore files from any commit, and mirror commits to a
//! remote blob store.
//!
//! Start with [`repo::Repo`].

pub mod commit;
pub mod entry_name;
pub mod lock;
pub mod remote;
pub mod repo;
pub mod revert;
pub mod staging;
pub mod store;

pub use repo::{Error, Repo, Result};
