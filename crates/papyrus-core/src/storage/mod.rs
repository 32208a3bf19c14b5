//! Storage layer
//!
//! Handles the versioned repository backing a store and the index file
//! inside its working tree.
//!
//! ## Architecture
//!
//! - **Revisions**: the revision-control capabilities the store needs
//!   (stage, commit, read HEAD), implemented over git by `GitRepository`
//! - **IndexFile**: atomic reads and writes of `index.yaml`

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

pub mod error;
pub mod git;
pub mod persistence;

pub use error::{ErrorCategory, StorageError, StorageResult};
pub use git::{CommitAuthor, GitRepository};
pub use persistence::{IndexFile, INDEX_FILE};

/// Short description of the newest revision
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionSummary {
    /// Abbreviated revision id
    pub id: String,
    /// First line of the commit message
    pub summary: String,
    pub time: DateTime<Utc>,
}

/// Revision-control operations a store depends on
///
/// Paths are relative to the working tree root. Any versioned backend
/// that can provide these is a valid substitute for git.
pub trait Revisions {
    /// Root of the working tree
    fn workdir(&self) -> &Path;

    /// Stage the current working tree contents of `path`
    fn stage(&self, path: &Path) -> StorageResult<()>;

    /// Commit everything staged, returning the new revision id
    fn commit(&self, message: &str) -> StorageResult<String>;

    /// Contents of `path` in the HEAD revision, `None` if the file is not
    /// in HEAD's tree or there is no revision yet
    fn head_contents(&self, path: &Path) -> StorageResult<Option<Vec<u8>>>;

    /// Number of revisions reachable from HEAD
    fn revision_count(&self) -> StorageResult<usize>;

    /// Newest revision, if any
    fn head_summary(&self) -> StorageResult<Option<RevisionSummary>>;

    /// Whether the working tree copy of `path` differs from HEAD
    ///
    /// A file missing on one side and present on the other differs.
    fn differs_from_head(&self, path: &Path) -> StorageResult<bool> {
        let full_path = self.workdir().join(path);
        let working = match fs::read(&full_path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(StorageError::ReadError {
                    path: full_path,
                    source: e,
                })
            }
        };

        Ok(working != self.head_contents(path)?)
    }
}
