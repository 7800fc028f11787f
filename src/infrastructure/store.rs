//! JSON file record store
//!
//! Holds the table in memory keyed by id and rewrites the whole file on
//! commit. The write goes through a temp file in the same directory and is
//! renamed into place, so a crash never leaves a half-written table.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::domain::Record;
use crate::infrastructure::traits::{FileSystem, RecordStore};

#[derive(Debug, Serialize, Deserialize)]
struct TableFile<R> {
    updated_at: Option<DateTime<Utc>>,
    #[serde(default = "Vec::new")]
    records: Vec<R>,
}

/// One record table persisted as a JSON file.
pub struct JsonFileStore<R> {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    records: BTreeMap<u32, R>,
    pending: usize,
}

impl<R: Record> JsonFileStore<R> {
    /// Open the store at `path`, loading existing records if the file exists.
    #[instrument(level = "debug", skip(path, fs), fields(file = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, fs: Arc<dyn FileSystem>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut records = BTreeMap::new();

        if fs.exists(&path) {
            let content = fs.read_to_string(&path)?;
            let table: TableFile<R> = serde_json::from_str(&content)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            for record in table.records {
                records.insert(record.id(), record);
            }
            debug!("loaded {} existing records", records.len());
        }

        Ok(Self {
            path,
            fs,
            records,
            pending: 0,
        })
    }

    pub fn get(&self, id: u32) -> Option<&R> {
        self.records.get(&id)
    }

    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.records.values()
    }

    /// Upserts not yet committed.
    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl<R: Record> RecordStore<R> for JsonFileStore<R> {
    fn upsert(&mut self, record: &R) -> io::Result<()> {
        self.records.insert(record.id(), record.clone());
        self.pending += 1;
        Ok(())
    }

    #[instrument(level = "debug", skip(self), fields(file = %self.path.display()))]
    fn commit(&mut self) -> io::Result<()> {
        let table = TableFile {
            updated_at: Some(Utc::now()),
            records: self.records.values().cloned().collect(),
        };
        let content = serde_json::to_string_pretty(&table)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.fs.ensure_parent(&self.path)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!(
            "committed {} records ({} pending)",
            self.records.len(),
            self.pending
        );
        self.pending = 0;
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
