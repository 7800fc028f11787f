//! Error conversion helpers for common I/O operations
//!
//! Provides extension traits for cleaner error handling with URL or path context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Mark an I/O error as a failed document fetch.
    ///
    /// # Example
    /// ```ignore
    /// let body = source.fetch(&url).with_url_context(&url)?;
    /// ```
    fn with_url_context(self, url: &str) -> ApplicationResult<T>;

    /// Mark an I/O error as a failed store operation on `path`.
    fn with_store_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_url_context(self, url: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Fetch {
            url: url.to_string(),
            source: e,
        })
    }

    fn with_store_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Store {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}
