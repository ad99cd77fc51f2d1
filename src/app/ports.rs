use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

/// Source of exported artifact bytes. A missing artifact must surface as
/// `InsightError::ArtifactNotFound`; there is no retry.
#[async_trait]
pub trait ArtifactReader: Send + Sync {
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;
}
