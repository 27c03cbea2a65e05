//! Distance cache: normalized request key -> last fetched distance.
//! Also the short-lived geocode cache.

mod geocode;
mod memory;
mod postgres;

pub use geocode::{CachedGeocoder, InMemoryGeocodeCache, GEOCODE_TTL_HOURS};
pub use memory::InMemoryDistanceCache;
pub use postgres::PgDistanceCache;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    entities::{DistanceRequest, DistanceResponse},
    error::Error,
};

/// Entries past their expiry are still returned, flagged `expired`.
/// `Ok(None)` means the key has never been written.
#[async_trait]
pub trait DistanceCache {
    async fn get_distance(
        &self,
        request: &DistanceRequest,
    ) -> Result<Option<DistanceResponse>, Error>;

    /// Overwrites whatever is stored under the request's key.
    async fn put_distance(
        &self,
        request: &DistanceRequest,
        response: &DistanceResponse,
    ) -> Result<(), Error>;
}

pub type DynDistanceCache = Arc<dyn DistanceCache + Send + Sync>;
