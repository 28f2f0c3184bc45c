//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{MatchingService, TreeService};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::{InfraError, InfraResult};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    pub trees: TreeService,
    pub matching: MatchingService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let trees = TreeService::new(Arc::clone(&fs));
        let matching = MatchingService::new(Arc::clone(&settings));

        Self {
            settings,
            fs,
            trees,
            matching,
        }
    }

    /// Size the global rayon pool used for frame sequences.
    ///
    /// `0` keeps rayon's default (one worker per core). Only the first call
    /// in a process takes effect.
    pub fn init_thread_pool(&self) -> InfraResult<()> {
        let threads = self.settings.threads;
        if threads == 0 {
            return Ok(());
        }
        debug!("init_thread_pool: threads={}", threads);
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| InfraError::ThreadPool {
                message: e.to_string(),
            })
    }
}
