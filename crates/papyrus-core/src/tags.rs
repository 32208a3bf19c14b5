//! Tag index
//!
//! Tags live on disk as `<store>/tags/<tag>/<key>.pdf`, each entry a
//! symbolic link to `<store>/<key>.pdf`. The directory tree is the whole
//! index: there is no other record of which paper carries which tag.
//!
//! The index only grows. Nothing here removes a link or a tag directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::models::{invalid_name_reason, paper_file_name};
use crate::storage::{StorageError, StorageResult};

/// Directory under the store root holding one directory per tag
pub const TAGS_DIR: &str = "tags";

/// What `TagIndex::tag` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    /// A new link was created
    Created,
    /// A link was already there and was left alone
    AlreadyTagged,
}

/// Symlink-based tag index of one store
#[derive(Debug, Clone)]
pub struct TagIndex {
    store_root: PathBuf,
}

impl TagIndex {
    /// `store_root` should be absolute; link targets are built from it
    pub fn new(store_root: impl Into<PathBuf>) -> Self {
        Self {
            store_root: store_root.into(),
        }
    }

    pub fn tags_dir(&self) -> PathBuf {
        self.store_root.join(TAGS_DIR)
    }

    /// Names of all tags, in directory enumeration order
    ///
    /// Creates the tags directory if it does not exist yet.
    pub fn list_tags(&self) -> StorageResult<Vec<String>> {
        let tags_dir = self.tags_dir();
        ensure_dir(&tags_dir)?;

        let mut tags = Vec::new();
        for entry in fs::read_dir(&tags_dir).map_err(|e| read_error(e, &tags_dir))? {
            let entry = entry.map_err(|e| read_error(e, &tags_dir))?;
            let file_type = entry.file_type().map_err(|e| read_error(e, &entry.path()))?;
            if file_type.is_dir() {
                tags.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        Ok(tags)
    }

    /// Tag a paper by linking `tags/<tag>/<key>.pdf` to `<store>/<key>.pdf`
    ///
    /// The paper file does not have to exist. An existing symbolic link at
    /// the link path (even a dangling one) counts as already tagged; any
    /// other file there is a `TagConflict`.
    pub fn tag(&self, key: &str, tag: &str) -> StorageResult<TagOutcome> {
        validate_name("paper", key)?;
        validate_name("tag", tag)?;

        let file_name = paper_file_name(key);
        let target = self.store_root.join(&file_name);
        let tag_dir = self.tags_dir().join(tag);
        ensure_dir(&tag_dir)?;

        let link = tag_dir.join(&file_name);
        match fs::symlink_metadata(&link) {
            Ok(meta) if meta.file_type().is_symlink() => {
                debug!("{} already tagged {}", key, tag);
                return Ok(TagOutcome::AlreadyTagged);
            }
            Ok(_) => return Err(StorageError::TagConflict { path: link }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(read_error(e, &link)),
        }

        symlink_file(&target, &link).map_err(|e| StorageError::from_io(e, link.clone()))?;
        info!("tagged {} as {}", key, tag);

        Ok(TagOutcome::Created)
    }

    /// Paper keys linked under `tag`, sorted
    ///
    /// An unknown tag has no papers.
    pub fn tagged(&self, tag: &str) -> StorageResult<Vec<String>> {
        validate_name("tag", tag)?;

        let tag_dir = self.tags_dir().join(tag);
        let entries = match fs::read_dir(&tag_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_error(e, &tag_dir)),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| read_error(e, &tag_dir))?;
            let file_type = entry.file_type().map_err(|e| read_error(e, &entry.path()))?;
            if !file_type.is_symlink() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(key) = name.strip_suffix(".pdf") {
                keys.push(key.to_string());
            }
        }
        keys.sort();

        Ok(keys)
    }
}

/// Reject names that cannot be a single path component
pub(crate) fn validate_name(kind: &'static str, name: &str) -> StorageResult<()> {
    match invalid_name_reason(name) {
        Some(reason) => Err(StorageError::InvalidName {
            kind,
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn ensure_dir(path: &Path) -> StorageResult<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| StorageError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })
}

fn read_error(source: io::Error, path: &Path) -> StorageError {
    StorageError::ReadError {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(unix)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tag_index(temp_dir: &TempDir) -> TagIndex {
        TagIndex::new(temp_dir.path().canonicalize().unwrap())
    }

    #[test]
    fn test_list_tags_creates_tags_dir() {
        let temp_dir = TempDir::new().unwrap();
        let index = tag_index(&temp_dir);

        assert!(index.list_tags().unwrap().is_empty());
        assert!(index.tags_dir().is_dir());
    }

    #[test]
    fn test_list_tags_only_directories() {
        let temp_dir = TempDir::new().unwrap();
        let index = tag_index(&temp_dir);
        fs::create_dir_all(index.tags_dir().join("ml")).unwrap();
        fs::create_dir_all(index.tags_dir().join("systems")).unwrap();
        fs::write(index.tags_dir().join("README"), "not a tag").unwrap();

        let mut tags = index.list_tags().unwrap();
        tags.sort();
        assert_eq!(tags, vec!["ml", "systems"]);
    }

    #[test]
    fn test_tag_creates_link_to_paper() {
        let temp_dir = TempDir::new().unwrap();
        let index = tag_index(&temp_dir);
        let root = temp_dir.path().canonicalize().unwrap();
        fs::write(root.join("foo.pdf"), "%PDF").unwrap();

        assert_eq!(index.tag("foo", "ml").unwrap(), TagOutcome::Created);

        let link = root.join("tags").join("ml").join("foo.pdf");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), root.join("foo.pdf"));
        assert_eq!(fs::read_to_string(&link).unwrap(), "%PDF");
        assert_eq!(index.list_tags().unwrap(), vec!["ml"]);
    }

    #[test]
    fn test_tag_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let index = tag_index(&temp_dir);

        assert_eq!(index.tag("foo", "ml").unwrap(), TagOutcome::Created);
        assert_eq!(index.tag("foo", "ml").unwrap(), TagOutcome::AlreadyTagged);

        let links: Vec<_> = fs::read_dir(index.tags_dir().join("ml"))
            .unwrap()
            .collect();
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_tag_missing_paper_leaves_dangling_link() {
        let temp_dir = TempDir::new().unwrap();
        let index = tag_index(&temp_dir);

        index.tag("ghost", "later").unwrap();

        let link = index.tags_dir().join("later").join("ghost.pdf");
        assert!(!link.exists());
        assert!(fs::symlink_metadata(&link).is_ok());
        assert_eq!(index.tag("ghost", "later").unwrap(), TagOutcome::AlreadyTagged);
    }

    #[test]
    fn test_regular_file_at_link_path_conflicts() {
        let temp_dir = TempDir::new().unwrap();
        let index = tag_index(&temp_dir);
        let tag_dir = index.tags_dir().join("ml");
        fs::create_dir_all(&tag_dir).unwrap();
        fs::write(tag_dir.join("foo.pdf"), "copy, not a link").unwrap();

        let err = index.tag("foo", "ml").unwrap_err();
        assert!(matches!(err, StorageError::TagConflict { .. }));

        // The file is left as it was
        assert_eq!(
            fs::read_to_string(tag_dir.join("foo.pdf")).unwrap(),
            "copy, not a link"
        );
    }

    #[test]
    fn test_invalid_names_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let index = tag_index(&temp_dir);

        assert!(matches!(
            index.tag("foo", "../escape").unwrap_err(),
            StorageError::InvalidName { kind: "tag", .. }
        ));
        assert!(matches!(
            index.tag("", "ml").unwrap_err(),
            StorageError::InvalidName { kind: "paper", .. }
        ));
        assert!(!index.tags_dir().exists());
    }

    #[test]
    fn test_tagged_lists_papers() {
        let temp_dir = TempDir::new().unwrap();
        let index = tag_index(&temp_dir);

        index.tag("zeta", "ml").unwrap();
        index.tag("alpha", "ml").unwrap();
        index.tag("other", "systems").unwrap();

        assert_eq!(index.tagged("ml").unwrap(), vec!["alpha", "zeta"]);
        assert_eq!(index.tagged("systems").unwrap(), vec!["other"]);
        assert!(index.tagged("unknown").unwrap().is_empty());
    }
}
