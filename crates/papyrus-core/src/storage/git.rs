//! Git-backed revisions
//!
//! The store directory is an ordinary (non-bare) git repository. Only the
//! index document is ever staged; paper files and tag links stay untracked
//! unless the user commits them by hand.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use git2::{Commit, ErrorCode, Repository, Signature};
use tracing::{debug, info, instrument};

use super::error::{StorageError, StorageResult};
use super::{RevisionSummary, Revisions};

const DEFAULT_AUTHOR_NAME: &str = "papyrus";
const DEFAULT_AUTHOR_EMAIL: &str = "papyrus@localhost";

/// Identity recorded on commits
///
/// Unset fields fall back to the repository's git configuration, then to
/// a fixed `papyrus <papyrus@localhost>` identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitAuthor {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A store repository opened through libgit2
pub struct GitRepository {
    repository: Repository,
    workdir: PathBuf,
    author: CommitAuthor,
}

impl GitRepository {
    /// Open the repository at `path`, or initialize one there
    ///
    /// Only `path` itself is considered; a repository in a parent
    /// directory is not picked up. Bare repositories are rejected.
    #[instrument(skip_all, level = "debug")]
    pub fn open_or_init(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        fs::create_dir_all(path).map_err(|source| StorageError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        })?;

        let repository = match Repository::open(path) {
            Ok(repository) => {
                debug!("opened existing repository");
                repository
            }
            Err(e) if e.code() == ErrorCode::NotFound => {
                info!("initialize new store repository: {}", path.display());
                Repository::init(path)?
            }
            Err(e) => return Err(e.into()),
        };

        // INVARIANT: a store always has a working tree.
        let workdir = match repository.workdir() {
            Some(dir) if !repository.is_bare() => dir.to_path_buf(),
            _ => {
                return Err(StorageError::BareRepository {
                    path: path.to_path_buf(),
                })
            }
        };

        Ok(Self {
            repository,
            workdir,
            author: CommitAuthor::default(),
        })
    }

    /// Use the given identity for commits
    pub fn with_author(mut self, author: CommitAuthor) -> Self {
        self.author = author;
        self
    }

    fn head_commit(&self) -> StorageResult<Option<Commit<'_>>> {
        match self.repository.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn signature(&self) -> StorageResult<Signature<'static>> {
        let configured = self.repository.signature().ok();
        let name = self
            .author
            .name
            .clone()
            .or_else(|| configured.as_ref().and_then(|s| s.name().map(String::from)))
            .unwrap_or_else(|| DEFAULT_AUTHOR_NAME.to_string());
        let email = self
            .author
            .email
            .clone()
            .or_else(|| configured.as_ref().and_then(|s| s.email().map(String::from)))
            .unwrap_or_else(|| DEFAULT_AUTHOR_EMAIL.to_string());

        Ok(Signature::now(&name, &email)?)
    }
}

impl Revisions for GitRepository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    #[instrument(skip(self), level = "debug")]
    fn stage(&self, path: &Path) -> StorageResult<()> {
        let mut index = self.repository.index()?;
        index.add_path(path)?;
        index.write()?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn commit(&self, message: &str) -> StorageResult<String> {
        // INVARIANT: the commit tree is whatever the index holds right now.
        let mut index = self.repository.index()?;
        let tree_oid = index.write_tree()?;
        let tree = self.repository.find_tree(tree_oid)?;

        let signature = self.signature()?;
        let parent = self.head_commit()?;
        let parents = parent.iter().collect::<Vec<_>>();

        let oid = self.repository.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        info!("committed {}: {}", oid, message);
        Ok(oid.to_string())
    }

    fn head_contents(&self, path: &Path) -> StorageResult<Option<Vec<u8>>> {
        let Some(commit) = self.head_commit()? else {
            return Ok(None);
        };
        let tree = commit.tree()?;

        let entry = match tree.get_path(path) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let blob = entry.to_object(&self.repository)?.peel_to_blob()?;

        Ok(Some(blob.content().to_vec()))
    }

    fn revision_count(&self) -> StorageResult<usize> {
        if self.head_commit()?.is_none() {
            return Ok(0);
        }

        let mut walk = self.repository.revwalk()?;
        walk.push_head()?;
        let mut count = 0;
        for oid in walk {
            oid?;
            count += 1;
        }
        Ok(count)
    }

    fn head_summary(&self) -> StorageResult<Option<RevisionSummary>> {
        let Some(commit) = self.head_commit()? else {
            return Ok(None);
        };

        let id = commit.id().to_string();
        let time = DateTime::from_timestamp(commit.time().seconds(), 0).unwrap_or_default();

        Ok(Some(RevisionSummary {
            id: id[..id.len().min(8)].to_string(),
            summary: commit.summary().unwrap_or_default().to_string(),
            time,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_author() -> CommitAuthor {
        CommitAuthor {
            name: Some("Test".to_string()),
            email: Some("test@example.com".to_string()),
        }
    }

    #[test]
    fn test_init_creates_repository() {
        let temp_dir = TempDir::new().unwrap();
        let store_dir = temp_dir.path().join("store");

        let repo = GitRepository::open_or_init(&store_dir).unwrap();

        assert!(store_dir.join(".git").is_dir());
        assert_eq!(repo.revision_count().unwrap(), 0);
        assert!(repo.head_summary().unwrap().is_none());
    }

    #[test]
    fn test_bare_repository_rejected() {
        let temp_dir = TempDir::new().unwrap();
        Repository::init_bare(temp_dir.path()).unwrap();

        let err = GitRepository::open_or_init(temp_dir.path())
            .err()
            .expect("bare repository must be rejected");
        assert!(matches!(err, StorageError::BareRepository { .. }));
    }

    #[test]
    fn test_parent_repository_not_discovered() {
        let temp_dir = TempDir::new().unwrap();
        Repository::init(temp_dir.path()).unwrap();
        let nested = temp_dir.path().join("papers");

        GitRepository::open_or_init(&nested).unwrap();

        assert!(nested.join(".git").is_dir());
    }

    #[test]
    fn test_stage_commit_and_read_head() {
        let temp_dir = TempDir::new().unwrap();
        let repo = GitRepository::open_or_init(temp_dir.path())
            .unwrap()
            .with_author(test_author());
        let file = Path::new("index.yaml");

        assert!(repo.head_contents(file).unwrap().is_none());

        fs::write(temp_dir.path().join(file), "a: {}\n").unwrap();
        assert!(repo.differs_from_head(file).unwrap());

        repo.stage(file).unwrap();
        repo.commit("first").unwrap();

        assert_eq!(repo.head_contents(file).unwrap().unwrap(), b"a: {}\n");
        assert!(!repo.differs_from_head(file).unwrap());
        assert_eq!(repo.revision_count().unwrap(), 1);

        let summary = repo.head_summary().unwrap().unwrap();
        assert_eq!(summary.summary, "first");
        assert_eq!(summary.id.len(), 8);
    }

    #[test]
    fn test_commits_chain_onto_head() {
        let temp_dir = TempDir::new().unwrap();
        let repo = GitRepository::open_or_init(temp_dir.path())
            .unwrap()
            .with_author(test_author());
        let file = Path::new("index.yaml");

        fs::write(temp_dir.path().join(file), "").unwrap();
        repo.stage(file).unwrap();
        repo.commit("one").unwrap();

        fs::write(temp_dir.path().join(file), "b: {}\n").unwrap();
        repo.stage(file).unwrap();
        repo.commit("two").unwrap();

        assert_eq!(repo.revision_count().unwrap(), 2);
        assert_eq!(repo.head_summary().unwrap().unwrap().summary, "two");
    }

    #[test]
    fn test_missing_working_file_differs() {
        let temp_dir = TempDir::new().unwrap();
        let repo = GitRepository::open_or_init(temp_dir.path())
            .unwrap()
            .with_author(test_author());
        let file = Path::new("index.yaml");

        fs::write(temp_dir.path().join(file), "").unwrap();
        repo.stage(file).unwrap();
        repo.commit("one").unwrap();
        fs::remove_file(temp_dir.path().join(file)).unwrap();

        assert!(repo.differs_from_head(file).unwrap());
    }

    #[test]
    fn test_reopen_keeps_history() {
        let temp_dir = TempDir::new().unwrap();
        {
            let repo = GitRepository::open_or_init(temp_dir.path())
                .unwrap()
                .with_author(test_author());
            fs::write(temp_dir.path().join("index.yaml"), "").unwrap();
            repo.stage(Path::new("index.yaml")).unwrap();
            repo.commit("one").unwrap();
        }

        let repo = GitRepository::open_or_init(temp_dir.path()).unwrap();
        assert_eq!(repo.revision_count().unwrap(), 1);
    }
}
