//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::services::IngestService;
use crate::application::ApplicationError;
use crate::config::{Settings, SourceKind};
use crate::domain::Record;
use crate::infrastructure::http::HttpSource;
use crate::infrastructure::mirror::MirrorSource;
use crate::infrastructure::store::JsonFileStore;
use crate::infrastructure::traits::{DocumentSource, FileSystem, RealFileSystem};
use crate::infrastructure::{InfraError, InfraResult};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Document source selected by `settings.source`
    pub source: Arc<dyn DocumentSource>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let source = Self::build_source(&settings, Arc::clone(&fs))?;
        Ok(Self::with_deps(settings, fs, source))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        source: Arc<dyn DocumentSource>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            source,
        }
    }

    fn build_source(
        settings: &Settings,
        fs: Arc<dyn FileSystem>,
    ) -> InfraResult<Arc<dyn DocumentSource>> {
        match settings.source {
            SourceKind::Http => {
                debug!("using HTTP source at {}", settings.api_base_url);
                let http = HttpSource::new(settings.request_timeout(), settings.request_delay())?;
                Ok(Arc::new(http))
            }
            SourceKind::Mirror => {
                let dir = settings.mirror_dir.clone().ok_or_else(|| ApplicationError::Config {
                    message: "source = \"mirror\" requires mirror_dir".into(),
                })?;
                debug!("using mirror source at {}", dir.display());
                Ok(Arc::new(MirrorSource::new(dir, settings.api_base_url.clone(), fs)))
            }
        }
    }

    pub fn ingest_service(&self) -> IngestService {
        IngestService::new(Arc::clone(&self.source), Arc::clone(&self.settings))
    }

    /// Open the record table at `path`, e.g. `settings.output`.
    pub fn open_store<R: Record>(&self, path: &Path) -> InfraResult<JsonFileStore<R>> {
        JsonFileStore::open(path, Arc::clone(&self.fs))
            .map_err(|e| InfraError::io(format!("open store {}", path.display()), e))
    }
}
