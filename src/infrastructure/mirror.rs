//! Local mirror document source
//!
//! Serves documents from a directory laid out like the API:
//! `<base>/pokemon-species/1/` is read from `<dir>/pokemon-species/1.json`.
//! Query strings are dropped, so the list `<base>/move/?limit=10000` is read
//! from `<dir>/move.json`.

use std::io;
use std::path::{Component, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::infrastructure::traits::{DocumentSource, FileSystem};

#[derive(Clone)]
pub struct MirrorSource {
    root: PathBuf,
    base_url: String,
    fs: Arc<dyn FileSystem>,
}

impl std::fmt::Debug for MirrorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorSource")
            .field("root", &self.root)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl MirrorSource {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
            fs,
        }
    }

    /// Map a resource URL (absolute under the base URL, or already relative)
    /// to its file in the mirror.
    pub fn path_for(&self, url: &str) -> io::Result<PathBuf> {
        let base = self.base_url.trim_end_matches('/');
        let relative = match url.strip_prefix(base) {
            Some(rest) => rest,
            None if url.contains("://") => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} is outside the mirrored API {}", url, self.base_url),
                ))
            }
            None => url,
        };
        let relative = match relative.split_once('?') {
            Some((path, _query)) => path,
            None => relative,
        };
        let relative = relative.trim_matches('/');
        if relative.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no resource path in {}", url),
            ));
        }

        let file = PathBuf::from(format!("{}.json", relative));
        if !file.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("resource path escapes mirror: {}", url),
            ));
        }
        Ok(self.root.join(file))
    }
}

impl DocumentSource for MirrorSource {
    #[instrument(level = "debug", skip(self))]
    fn fetch(&self, url: &str) -> io::Result<String> {
        let path = self.path_for(url)?;
        debug!("mirror file: {}", path.display());
        if !self.fs.is_file(&path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not mirrored: {}", path.display()),
            ));
        }
        self.fs.read_to_string(&path)
    }
}
