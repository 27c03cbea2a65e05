use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::{
    entities::Coordinates,
    external::google_maps::{DynGeocoder, Geocoder, GoogleMapsError},
};

pub const GEOCODE_TTL_HOURS: i64 = 24;

#[derive(Clone, Debug)]
struct GeocodeCacheEntry {
    coordinates: Coordinates,
    expires_at: DateTime<Utc>,
}

/// Address -> coordinates, kept for a fixed TTL. Expired entries are dropped
/// on the read that finds them.
pub struct InMemoryGeocodeCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, GeocodeCacheEntry>>,
}

impl Default for InMemoryGeocodeCache {
    fn default() -> Self {
        Self::with_ttl(Duration::hours(GEOCODE_TTL_HOURS))
    }
}

impl InMemoryGeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, address: &str) -> Option<Coordinates> {
        let now = Utc::now();
        {
            let entries = self.entries.read().await;
            match entries.get(address) {
                None => return None,
                Some(entry) if now <= entry.expires_at => return Some(entry.coordinates),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        // another reader may have refreshed it in between
        match entries.get(address) {
            Some(entry) if now <= entry.expires_at => Some(entry.coordinates),
            Some(_) => {
                entries.remove(address);
                None
            }
            None => None,
        }
    }

    pub async fn set(&self, address: &str, coordinates: Coordinates) {
        let entry = GeocodeCacheEntry {
            coordinates,
            expires_at: Utc::now() + self.ttl,
        };
        self.entries.write().await.insert(address.to_owned(), entry);
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
}

/// Wraps a geocoder so repeated addresses skip the upstream call.
/// Failures are not cached.
pub struct CachedGeocoder {
    inner: DynGeocoder,
    cache: InMemoryGeocodeCache,
}

impl CachedGeocoder {
    pub fn new(inner: DynGeocoder) -> Self {
        Self::with_cache(inner, InMemoryGeocodeCache::new())
    }

    pub fn with_cache(inner: DynGeocoder, cache: InMemoryGeocodeCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &InMemoryGeocodeCache {
        &self.cache
    }
}

#[async_trait]
impl Geocoder for CachedGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GoogleMapsError> {
        if let Some(coordinates) = self.cache.get(address).await {
            tracing::debug!(address, "geocode cache hit");
            return Ok(coordinates);
        }

        let coordinates = self.inner.geocode(address).await?;
        self.cache.set(address, coordinates).await;

        Ok(coordinates)
    }
}
