//! Artifact Store port
//!
//! Versioned blob storage used by the artifact publisher. Every save of a
//! name creates a new version starting at 1.

use async_trait::async_trait;
use think_tank_domain::{Artifact, ArtifactRef};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactStoreError {
    #[error("Storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn save(
        &self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ArtifactRef, ArtifactStoreError>;

    /// Load a version; a reference without a version loads the latest.
    async fn load(&self, reference: &ArtifactRef) -> Result<Option<Artifact>, ArtifactStoreError>;

    /// Saved versions of `name`, ascending
    async fn list_versions(&self, name: &str) -> Result<Vec<u32>, ArtifactStoreError>;
}
