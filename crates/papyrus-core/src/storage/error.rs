//! Storage error handling
//!
//! Typed errors for the repository, index document and tag directory,
//! with descriptive messages and a coarse category used by the CLI to
//! pick an exit code.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Store path is a bare repository (no working tree)
    #[error("'{path}' is a bare repository; a store needs a working tree")]
    BareRepository { path: PathBuf },

    /// Failed to create a directory
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Index document cannot be parsed
    #[error("Invalid document format in '{path}': {details}")]
    InvalidFormat { path: PathBuf, details: String },

    /// Index document cannot be serialized
    #[error("Failed to serialize index: {0}")]
    Serialize(#[source] serde_yaml::Error),

    /// A paper key or tag name that cannot be used as a path component
    #[error("Invalid {kind} name '{name}': {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: &'static str,
    },

    /// Something other than a tag link occupies a tag link path
    #[error("Cannot tag: '{path}' exists and is not a symbolic link")]
    TagConflict { path: PathBuf },

    /// Git error while opening or initializing the store
    #[error("Repository error: {0}")]
    Git(#[from] git2::Error),

    /// Git error while recording a revision of an open store
    #[error("Failed to record revision: {source}")]
    Commit {
        #[source]
        source: git2::Error,
    },

    /// File not found (when expected to exist)
    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Broad failure category, one per CLI exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The store could not be opened or initialized
    Initialization,
    /// The index document is malformed
    Parse,
    /// Filesystem read/write/link failure
    Io,
    /// The request itself was rejected (bad name, conflicting path)
    Rejected,
}

impl StorageError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StorageError::NotFound { path },
            _ if is_disk_full_error(&error) => StorageError::DiskFull {
                path,
                source: error,
            },
            _ => StorageError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Failure category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            StorageError::BareRepository { .. } | StorageError::Git(_) => {
                ErrorCategory::Initialization
            }
            StorageError::InvalidFormat { .. } => ErrorCategory::Parse,
            StorageError::InvalidName { .. } | StorageError::TagConflict { .. } => {
                ErrorCategory::Rejected
            }
            StorageError::CreateDirectory { .. }
            | StorageError::PermissionDenied { .. }
            | StorageError::DiskFull { .. }
            | StorageError::ReadError { .. }
            | StorageError::WriteError { .. }
            | StorageError::NotFound { .. }
            | StorageError::AtomicWriteFailed { .. }
            | StorageError::Commit { .. }
            | StorageError::Serialize(_) => ErrorCategory::Io,
        }
    }

    /// Reclassify a git failure as a failed revision write
    ///
    /// Used once the store is open, where a git error is an I/O problem
    /// rather than an initialization one.
    pub fn into_commit_error(self) -> Self {
        match self {
            StorageError::Git(source) => StorageError::Commit { source },
            other => other,
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free up disk space and try again."),
            StorageError::PermissionDenied { .. } => {
                Some("Check file and directory permissions of the store.")
            }
            StorageError::BareRepository { .. } => {
                Some("Point --store at a non-bare clone or an empty directory.")
            }
            StorageError::InvalidFormat { .. } => {
                Some("Fix index.yaml by hand, or restore it with `git checkout index.yaml`.")
            }
            StorageError::TagConflict { .. } => {
                Some("Move the file out of the tag directory and tag again.")
            }
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, PathBuf::from("/test/path"));

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert_eq!(err.category(), ErrorCategory::Io);
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_not_found_classification() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = StorageError::from_io(io_err, PathBuf::from("/missing/file"));

        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StorageError::from_io(io_err, PathBuf::from("/full/disk"));

        assert!(matches!(err, StorageError::DiskFull { .. }));
    }

    #[test]
    fn test_categories() {
        let bare = StorageError::BareRepository {
            path: PathBuf::from("/repo.git"),
        };
        assert_eq!(bare.category(), ErrorCategory::Initialization);

        let parse = StorageError::InvalidFormat {
            path: PathBuf::from("index.yaml"),
            details: "bad indent".to_string(),
        };
        assert_eq!(parse.category(), ErrorCategory::Parse);

        let conflict = StorageError::TagConflict {
            path: PathBuf::from("tags/ml/foo.pdf"),
        };
        assert_eq!(conflict.category(), ErrorCategory::Rejected);

        let git = StorageError::Git(git2::Error::from_str("locked"));
        assert_eq!(git.category(), ErrorCategory::Initialization);
        assert_eq!(git.into_commit_error().category(), ErrorCategory::Io);
    }

    #[test]
    fn test_into_commit_error_keeps_other_variants() {
        let err = StorageError::NotFound {
            path: PathBuf::from("index.yaml"),
        }
        .into_commit_error();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::InvalidName {
            kind: "tag",
            name: "a/b".to_string(),
            reason: "contains a path separator",
        };

        let msg = err.to_string();
        assert!(msg.contains("tag"));
        assert!(msg.contains("a/b"));
        assert!(msg.contains("path separator"));
    }
}
