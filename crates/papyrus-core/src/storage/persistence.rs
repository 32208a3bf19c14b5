//! Index file persistence
//!
//! Reads and writes `index.yaml` in the store's working tree. Writes are
//! atomic (write to temp file, then rename) so a crash never leaves a
//! half-written index behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::error::{StorageError, StorageResult};

/// File name of the index document at the store root
pub const INDEX_FILE: &str = "index.yaml";

/// Handle on the index document file of one store
#[derive(Debug, Clone)]
pub struct IndexFile {
    path: PathBuf,
}

impl IndexFile {
    /// Index file inside the given store root
    pub fn in_store(root: &Path) -> Self {
        Self {
            path: root.join(INDEX_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the index exists in the working tree
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the whole file as UTF-8
    pub fn read(&self) -> StorageResult<String> {
        let bytes = fs::read(&self.path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound {
                path: self.path.clone(),
            },
            _ => StorageError::ReadError {
                path: self.path.clone(),
                source,
            },
        })?;

        String::from_utf8(bytes).map_err(|e| StorageError::InvalidFormat {
            path: self.path.clone(),
            details: format!("not valid UTF-8: {}", e),
        })
    }

    /// Replace the file contents atomically
    pub fn write(&self, contents: impl AsRef<[u8]>) -> StorageResult<()> {
        atomic_write(&self.path, contents.as_ref())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Same directory, so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let index = IndexFile::in_store(temp_dir.path());

        assert!(!index.exists());
        index.write("foo:\n  title: Foo\n").unwrap();
        assert!(index.exists());
        assert_eq!(index.read().unwrap(), "foo:\n  title: Foo\n");

        // No temp file left behind
        assert!(!temp_dir.path().join("index.tmp").exists());
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let index = IndexFile::in_store(temp_dir.path());

        let err = index.read().unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_read_rejects_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let index = IndexFile::in_store(temp_dir.path());
        fs::write(index.path(), [0xff, 0xfe, 0x00]).unwrap();

        let err = index.read().unwrap_err();
        assert!(matches!(err, StorageError::InvalidFormat { .. }));
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("file.txt");

        atomic_write(&nested_path, b"test data").unwrap();

        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "test data");
    }
}
