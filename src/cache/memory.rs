use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::DistanceCache;
use crate::{
    entities::{DistanceCacheEntry, DistanceRequest, DistanceResponse},
    error::Error,
    fingerprint::make_distance_cache_key,
};

/// Process-local cache. Construct once and share it behind an `Arc`.
#[derive(Default)]
pub struct InMemoryDistanceCache {
    entries: RwLock<HashMap<String, DistanceCacheEntry>>,
}

impl InMemoryDistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Stores an entry as is, status included.
    pub async fn put_entry(&self, request: &DistanceRequest, entry: DistanceCacheEntry) {
        let key = make_distance_cache_key(request);
        self.entries.write().await.insert(key, entry);
    }
}

#[async_trait]
impl DistanceCache for InMemoryDistanceCache {
    async fn get_distance(
        &self,
        request: &DistanceRequest,
    ) -> Result<Option<DistanceResponse>, Error> {
        let key = make_distance_cache_key(request);
        let entries = self.entries.read().await;

        Ok(entries.get(&key).map(|entry| entry.to_response(Utc::now())))
    }

    async fn put_distance(
        &self,
        request: &DistanceRequest,
        response: &DistanceResponse,
    ) -> Result<(), Error> {
        self.put_entry(request, DistanceCacheEntry::from_response(response))
            .await;
        Ok(())
    }
}
