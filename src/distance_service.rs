//! Cache-first distance lookups with hit/miss accounting.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::{
    cache::DynDistanceCache,
    entities::{DistanceMetrics, DistanceRequest, DistanceResponse},
    external::google_maps::{DynDistanceMatrixClient, GoogleMapsError},
};

/// Cache keys need a departure time; requests without one are keyed at now.
/// The provider still gets the request as submitted.
fn pin_departure_time(request: &DistanceRequest) -> DistanceRequest {
    let mut keyed = request.clone();
    keyed.departure_time.get_or_insert_with(Utc::now);
    keyed
}

pub struct CachedDistanceService {
    cache: DynDistanceCache,
    client: DynDistanceMatrixClient,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedDistanceService {
    pub fn new(cache: DynDistanceCache, client: DynDistanceMatrixClient) -> Self {
        Self {
            cache,
            client,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Serves from the cache when the key exists, stale or not. On a miss the
    /// provider is called and its answer is written back in the background.
    #[tracing::instrument(skip(self))]
    pub async fn get_distance(
        &self,
        request: &DistanceRequest,
    ) -> Result<DistanceResponse, GoogleMapsError> {
        // the read and the write must land in the same time bucket
        let keyed = pin_departure_time(request);

        match self.cache.get_distance(&keyed).await {
            Ok(Some(cached)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(cached);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(%err, "distance cache read failed, treating as miss");
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let response = self.client.fetch_distance(request).await?;

        // best effort, never awaited by the caller
        let cache = self.cache.clone();
        let fetched = response.clone();
        tokio::spawn(async move {
            if let Err(err) = cache.put_distance(&keyed, &fetched).await {
                tracing::error!(%err, "failed to store distance in cache");
            }
        });

        Ok(response)
    }

    pub fn get_metrics(&self) -> DistanceMetrics {
        DistanceMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn reset_metrics(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
