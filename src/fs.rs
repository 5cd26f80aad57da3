//! Filesystem adapter.
//!
//! The pipeline never touches the disk directly; every read, write and
//! existence check goes through `FileSystem` so that tests and embedders can
//! substitute their own implementation.

use std::future::Future;
use std::path::Path;

use crate::error::{CodegenError, Result};

/// Async file operations used by the generator.
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> impl Future<Output = Result<bool>> + Send;

    fn read(&self, path: &Path) -> impl Future<Output = Result<String>> + Send;

    fn write(&self, path: &Path, content: &str) -> impl Future<Output = Result<()>> + Send;

    /// Create `path` and all missing parents. Succeeds if it already exists.
    fn make_dir_all(&self, path: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// `tokio::fs` backed implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

impl FileSystem for TokioFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        tokio::fs::try_exists(path)
            .await
            .map_err(|e| CodegenError::io("checking file", path, e))
    }

    async fn read(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CodegenError::io("reading file", path, e))
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        tokio::fs::write(path, content)
            .await
            .map_err(|e| CodegenError::io("writing file", path, e))
    }

    async fn make_dir_all(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| CodegenError::io("creating directory", path, e))
    }
}
