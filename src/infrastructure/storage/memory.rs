use super::{MediaStorage, StorageResult};
use crate::modules::video::media::Resource;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Process-local storage for development and tests.
#[derive(Clone, Default)]
pub struct InMemoryMediaStorage {
    objects: Arc<RwLock<HashMap<String, Resource>>>,
}

impl InMemoryMediaStorage {
    pub fn new() -> Self {
        info!("✅ Using in-memory media storage");
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl MediaStorage for InMemoryMediaStorage {
    async fn store(&self, path: &str, resource: &Resource) -> StorageResult<()> {
        debug!(path, bytes = resource.content.len(), "storing object");
        self.objects
            .write()
            .await
            .insert(path.to_string(), resource.clone());
        Ok(())
    }

    async fn get(&self, path: &str) -> StorageResult<Option<Resource>> {
        Ok(self.objects.read().await.get(path).cloned())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete_all(&self, paths: &[String]) -> StorageResult<()> {
        let mut objects = self.objects.write().await;
        for path in paths {
            objects.remove(path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(name: &str) -> Resource {
        Resource::new(b"content".to_vec(), "checksum", "video/mp4", name)
    }

    #[tokio::test]
    async fn store_overwrites_the_same_path() {
        let storage = InMemoryMediaStorage::new();

        storage.store("videoId-1/type-VIDEO", &resource("first")).await.unwrap();
        storage.store("videoId-1/type-VIDEO", &resource("second")).await.unwrap();

        assert_eq!(storage.len().await, 1);
        let stored = storage.get("videoId-1/type-VIDEO").await.unwrap().unwrap();
        assert_eq!(stored.name, "second");
    }

    #[tokio::test]
    async fn list_and_delete_by_prefix() {
        let storage = InMemoryMediaStorage::new();
        for key in ["videoId-1/type-VIDEO", "videoId-1/type-BANNER", "videoId-2/type-VIDEO"] {
            storage.store(key, &resource(key)).await.unwrap();
        }

        let keys = storage.list("videoId-1").await.unwrap();
        assert_eq!(keys, vec!["videoId-1/type-BANNER", "videoId-1/type-VIDEO"]);

        storage.delete_all(&keys).await.unwrap();

        assert_eq!(storage.len().await, 1);
        assert!(storage.get("videoId-2/type-VIDEO").await.unwrap().is_some());
        assert!(storage.get("videoId-1/type-VIDEO").await.unwrap().is_none());
    }
}
