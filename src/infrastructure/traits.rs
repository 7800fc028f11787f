//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with in-memory implementations.

use std::io;
use std::path::Path;

use crate::domain::Record;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Key-value document fetch service.
///
/// Keys are resource URLs as they appear in upstream documents; values are
/// raw JSON bodies. Decoding is left to the caller.
pub trait DocumentSource: Send + Sync {
    /// Fetch the document stored under `url`.
    fn fetch(&self, url: &str) -> io::Result<String>;
}

/// URL of resource `kind` with `id` under the API root, e.g. `.../pokemon/25/`.
pub fn resource_url(base: &str, kind: &str, id: u32) -> String {
    format!("{}/{}/{}/", base.trim_end_matches('/'), kind, id)
}

/// URL listing up to `limit` resources of `kind`, e.g. `.../move/?limit=10000`.
pub fn resource_list_url(base: &str, kind: &str, limit: u32) -> String {
    format!("{}/{}/?limit={}", base.trim_end_matches('/'), kind, limit)
}

/// Tabular store for one record table, keyed by id.
pub trait RecordStore<R: Record> {
    /// Insert the record, replacing any record with the same id.
    fn upsert(&mut self, record: &R) -> io::Result<()>;

    /// Make all upserts so far durable.
    fn commit(&mut self) -> io::Result<()>;

    /// Number of records currently held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Where the store persists, for error context.
    fn location(&self) -> &Path;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
