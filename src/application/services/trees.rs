//! Tree file service
//!
//! Loads and stores frame sequences in the JSON exchange format.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::exchange::{parse_frames, render_frames};
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::Tree;
use crate::infrastructure::traits::FileSystem;

/// Service for reading and writing tree files.
pub struct TreeService {
    fs: Arc<dyn FileSystem>,
}

impl TreeService {
    /// Create a new tree service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load every frame stored in `path`.
    pub fn load_frames(&self, path: &Path) -> ApplicationResult<Vec<Tree>> {
        debug!("load_frames: path={}", path.display());
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read tree file", path)?;
        parse_frames(&content, path)
    }

    /// Write `frames` to `path` as a frame sequence.
    pub fn save_frames(&self, path: &Path, frames: &[Tree]) -> ApplicationResult<()> {
        debug!("save_frames: path={} frames={}", path.display(), frames.len());
        let content = render_frames(frames)?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write tree file", path)
    }
}
