//! Process-local versioned artifact store

use async_trait::async_trait;
use std::collections::HashMap;
use think_tank_application::ports::artifact_store::{ArtifactStore, ArtifactStoreError};
use think_tank_domain::{Artifact, ArtifactRef};
use tokio::sync::RwLock;
use tracing::debug;

/// Artifacts kept in memory; versions of a name start at 1
#[derive(Default)]
pub struct InMemoryArtifactStore {
    versions: RwLock<HashMap<String, Vec<Artifact>>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn save(
        &self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ArtifactRef, ArtifactStoreError> {
        let mut versions = self.versions.write().await;
        let history = versions.entry(name.to_string()).or_default();
        let reference = ArtifactRef::new(name, history.len() as u32 + 1);
        history.push(Artifact {
            reference: reference.clone(),
            mime_type: mime_type.to_string(),
            bytes,
        });
        debug!("Stored artifact {}", reference);
        Ok(reference)
    }

    async fn load(&self, reference: &ArtifactRef) -> Result<Option<Artifact>, ArtifactStoreError> {
        let versions = self.versions.read().await;
        let Some(history) = versions.get(&reference.name) else {
            return Ok(None);
        };
        let artifact = match reference.version {
            Some(0) => None,
            Some(version) => history.get(version as usize - 1),
            None => history.last(),
        };
        Ok(artifact.cloned())
    }

    async fn list_versions(&self, name: &str) -> Result<Vec<u32>, ArtifactStoreError> {
        Ok(self
            .versions
            .read()
            .await
            .get(name)
            .map(|history| {
                history
                    .iter()
                    .filter_map(|artifact| artifact.reference.version)
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use think_tank_domain::artifact::PDF_MIME;

    #[tokio::test]
    async fn test_versions_increase_per_name() {
        let store = InMemoryArtifactStore::new();
        let first = store.save("user:a.pdf", PDF_MIME, vec![1]).await.unwrap();
        let second = store.save("user:a.pdf", PDF_MIME, vec![2]).await.unwrap();
        let other = store.save("user:b.pdf", PDF_MIME, vec![3]).await.unwrap();

        assert_eq!(first, ArtifactRef::new("user:a.pdf", 1));
        assert_eq!(second, ArtifactRef::new("user:a.pdf", 2));
        assert_eq!(other.version, Some(1));
        assert_eq!(store.list_versions("user:a.pdf").await.unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_load_specific_and_latest() {
        let store = InMemoryArtifactStore::new();
        store.save("r.pdf", PDF_MIME, vec![1]).await.unwrap();
        store.save("r.pdf", PDF_MIME, vec![2]).await.unwrap();

        let first = store.load(&ArtifactRef::new("r.pdf", 1)).await.unwrap().unwrap();
        assert_eq!(first.bytes, vec![1]);
        let latest = store.load(&ArtifactRef::latest("r.pdf")).await.unwrap().unwrap();
        assert_eq!(latest.bytes, vec![2]);
        assert!(store.load(&ArtifactRef::new("r.pdf", 3)).await.unwrap().is_none());
        assert!(store.load(&ArtifactRef::new("r.pdf", 0)).await.unwrap().is_none());
        assert!(store.load(&ArtifactRef::latest("nope")).await.unwrap().is_none());
    }
}
