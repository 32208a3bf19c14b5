//! papyrus Core Library
//!
//! This crate provides the core functionality for papyrus, a personal
//! reference manager that keeps paper metadata in one YAML index under
//! git and tags papers with symbolic links.
//!
//! # Architecture
//!
//! - **index.yaml**: source of truth for paper metadata, versioned in git
//! - **tags/**: secondary index, one directory per tag holding links to
//!   paper files
//!
//! All queries are served from the in-memory index document.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open_or_create("/home/me/papers")?;
//!
//! // Add a paper
//! let entry = Entry::new().with_title("Foo Paper").with_authors(["Alice", "Bob"]);
//! store.add("foo", entry)?;
//!
//! // Tag it
//! store.tag("foo", "ml")?;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: The `Entry` metadata record
//! - `index`: Index document parsing and serialization
//! - `tags`: Symlink tag index
//! - `storage`: Git revisions, index file persistence and errors
//! - `config`: Application configuration

pub mod config;
pub mod index;
pub mod models;
pub mod storage;
pub mod store;
pub mod tags;

pub use config::Config;
pub use index::IndexDocument;
pub use models::Entry;
pub use storage::{ErrorCategory, RevisionSummary, StorageError};
pub use store::Store;
pub use tags::TagOutcome;
