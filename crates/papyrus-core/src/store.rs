//! Unified storage interface
//!
//! The `Store` owns one paper store: the git repository, the in-memory
//! index document and the tag index. It coordinates between:
//! - git (revision history of `index.yaml`)
//! - the index document (loaded once, mutated in memory, written back)
//! - the tag directory (symbolic links, never committed)
//!
//! ## Bootstrap
//!
//! Opening a directory that is not a repository initializes one. Either
//! way the index document is guaranteed to exist afterwards; a brand-new
//! store gets an empty index committed as its first revision.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open_or_create("/home/me/papers")?;
//!
//! store.add("smith2019", Entry::new().with_title("Deep Things"))?;
//! store.tag("smith2019", "ml")?;
//!
//! let titles = store.titles();
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::index::IndexDocument;
use crate::models::{paper_file_name, Entry};
use crate::storage::{
    CommitAuthor, GitRepository, IndexFile, RevisionSummary, Revisions, StorageError,
    StorageResult, INDEX_FILE,
};
use crate::tags::{validate_name, TagIndex, TagOutcome};

/// Message of the revision that creates the index in a new store
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit of index file";

/// Message of every revision written by `synchronize`
pub const SYNC_COMMIT_MESSAGE: &str = "Synchronize index file";

/// A paper store
pub struct Store {
    /// Canonical store root
    root: PathBuf,
    repository: GitRepository,
    index_file: IndexFile,
    /// The index document as last loaded or mutated
    doc: IndexDocument,
    tags: TagIndex,
}

impl Store {
    /// Open the store at `path`, creating it if needed
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_author(path.as_ref(), CommitAuthor::default())
    }

    /// Open the store named by the configuration
    pub fn open_with_config(config: &Config) -> Result<Self> {
        Self::open_with_author(&config.store_dir, config.commit_author())
    }

    fn open_with_author(path: &Path, author: CommitAuthor) -> Result<Self> {
        let repository = GitRepository::open_or_init(path)
            .with_context(|| format!("Failed to open store at {:?}", path))?
            .with_author(author);

        let root = fs::canonicalize(repository.workdir())
            .with_context(|| format!("Failed to resolve store path {:?}", path))?;
        let index_file = IndexFile::in_store(&root);

        ensure_index(&repository, &index_file).context("Failed to initialize index document")?;

        let contents = index_file
            .read()
            .context("Failed to read index document")?;
        let doc = IndexDocument::parse(&contents, index_file.path())
            .context("Failed to load index document")?;
        debug!("loaded {} entries from {:?}", doc.len(), index_file.path());

        Ok(Self {
            tags: TagIndex::new(&root),
            root,
            repository,
            index_file,
            doc,
        })
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the index document
    pub fn index_path(&self) -> &Path {
        self.index_file.path()
    }

    /// Absolute path of a paper's file (which may not exist)
    pub fn paper_path(&self, key: &str) -> PathBuf {
        self.root.join(paper_file_name(key))
    }

    // ==================== Index Operations ====================

    /// All paper keys, sorted
    pub fn entries(&self) -> Vec<String> {
        self.doc.keys()
    }

    /// All authors across entries, deduplicated and sorted
    pub fn authors(&self) -> Vec<String> {
        self.doc.authors()
    }

    /// All titles, sorted
    pub fn titles(&self) -> Vec<String> {
        self.doc.titles()
    }

    /// Get one entry
    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.doc.get(key)
    }

    /// Insert or update an entry, then synchronize
    ///
    /// Returns whether a new revision was created.
    pub fn add(&mut self, key: &str, entry: Entry) -> Result<bool> {
        validate_name("paper", key)?;
        self.doc.upsert(key, entry);
        self.synchronize()
    }

    /// Write the index document and commit it if it changed
    ///
    /// Returns whether a new revision was created. Calling this twice in
    /// a row never creates a second revision.
    pub fn synchronize(&mut self) -> Result<bool> {
        synchronize_index(&self.repository, &self.index_file, &self.doc)
            .context("Failed to synchronize index document")
    }

    /// Keys whose paper file is missing
    ///
    /// Advisory only; no other operation checks paper files.
    pub fn validate(&self) -> Vec<String> {
        self.doc
            .keys()
            .into_iter()
            .filter(|key| !self.paper_path(key).is_file())
            .collect()
    }

    // ==================== Tag Operations ====================

    /// All tag names, in directory enumeration order
    pub fn list_tags(&self) -> Result<Vec<String>> {
        self.tags.list_tags().context("Failed to list tags")
    }

    /// Tag a paper
    pub fn tag(&self, key: &str, tag: &str) -> Result<TagOutcome> {
        self.tags
            .tag(key, tag)
            .with_context(|| format!("Failed to tag '{}' as '{}'", key, tag))
    }

    /// Papers carrying a tag, sorted
    pub fn tagged(&self, tag: &str) -> Result<Vec<String>> {
        self.tags
            .tagged(tag)
            .with_context(|| format!("Failed to list papers tagged '{}'", tag))
    }

    // ==================== History ====================

    /// Number of revisions in the store
    pub fn revision_count(&self) -> Result<usize> {
        self.repository
            .revision_count()
            .context("Failed to count revisions")
    }

    /// Newest revision
    pub fn head_summary(&self) -> Result<Option<RevisionSummary>> {
        self.repository
            .head_summary()
            .context("Failed to read HEAD revision")
    }
}

/// Make sure the index document exists in the working tree
///
/// - absent everywhere: create it empty and commit it
/// - only in HEAD: restore it from HEAD
/// - only in the working tree: leave it for the next synchronize
fn ensure_index<R: Revisions>(repository: &R, index_file: &IndexFile) -> StorageResult<()> {
    let index_path = Path::new(INDEX_FILE);
    if index_file.exists() {
        return Ok(());
    }

    match repository.head_contents(index_path)? {
        Some(contents) => {
            warn!("index document missing from working tree, restoring it from HEAD");
            index_file.write(contents)
        }
        None => {
            index_file.write("")?;
            repository.stage(index_path)?;
            repository.commit(INITIAL_COMMIT_MESSAGE)?;
            info!("created index document {:?}", index_file.path());
            Ok(())
        }
    }
}

/// Write `doc` and commit it only when it differs from HEAD
fn synchronize_index<R: Revisions>(
    repository: &R,
    index_file: &IndexFile,
    doc: &IndexDocument,
) -> StorageResult<bool> {
    index_file.write(doc.to_yaml()?)?;

    let index_path = Path::new(INDEX_FILE);
    let changed = repository
        .differs_from_head(index_path)
        .map_err(StorageError::into_commit_error)?;
    if !changed {
        debug!("index unchanged since HEAD, nothing to commit");
        return Ok(false);
    }

    repository
        .stage(index_path)
        .map_err(StorageError::into_commit_error)?;
    repository
        .commit(SYNC_COMMIT_MESSAGE)
        .map_err(StorageError::into_commit_error)?;
    Ok(true)
}
