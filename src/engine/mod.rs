mod distance_api;
mod geocode_api;
mod optimization;
mod route_api;

pub use optimization::{fallback_reason, optimize_with_fallback};

use crate::{
    api::API,
    distance_service::CachedDistanceService,
    external::{google_maps::DynGeocoder, optimizer::DynOptimizerClient},
    repository::DynRouteRepository,
};

/// Every collaborator is built once at start-up and handed in here.
pub struct Engine {
    optimizer: DynOptimizerClient,
    distances: CachedDistanceService,
    routes: DynRouteRepository,
    geocoder: Option<DynGeocoder>,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub fn new(
        optimizer: DynOptimizerClient,
        distances: CachedDistanceService,
        routes: DynRouteRepository,
        geocoder: Option<DynGeocoder>,
    ) -> Self {
        if geocoder.is_none() {
            tracing::warn!("no geocoder configured, geocode requests will fail");
        }

        Self {
            optimizer,
            distances,
            routes,
            geocoder,
        }
    }
}

impl API for Engine {}
