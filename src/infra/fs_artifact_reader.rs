use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use crate::app::ports::ArtifactReader;
use crate::error::{InsightError, Result};

/// Reads artifacts straight from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactReader;

#[async_trait]
impl ArtifactReader for FsArtifactReader {
    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                debug!("Read {} bytes from {}", bytes.len(), path.display());
                Ok(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(InsightError::ArtifactNotFound(path.to_path_buf())),
            Err(e) => Err(InsightError::Io(e)),
        }
    }
}
