use std::sync::Arc;

use routekun::api::DynAPI;
use routekun::cache::{CachedGeocoder, DynDistanceCache, InMemoryDistanceCache, PgDistanceCache};
use routekun::config::Config;
use routekun::db::PgStore;
use routekun::distance_service::CachedDistanceService;
use routekun::engine::Engine;
use routekun::error::Error;
use routekun::external::google_maps::{
    DynDistanceMatrixClient, DynGeocoder, FixedDistanceMatrixClient, HttpDistanceMatrixClient,
    HttpGeocoder,
};
use routekun::external::optimizer::{HttpOptimizerClient, OptimizerClientConfig};
use routekun::repository::{DynRouteRepository, InMemoryRouteRepository, PgRouteRepository};
use routekun::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let optimizer = HttpOptimizerClient::new(
        OptimizerClientConfig::new(config.optimizer_url.clone())
            .timeout(config.optimizer_timeout)
            .retry_delays(config.optimizer_retry_delays.clone()),
    )?;

    let (cache, routes): (DynDistanceCache, DynRouteRepository) = match &config.database_url {
        Some(url) => {
            let store = PgStore::new(url, config.database_max_connections).await?;
            (
                Arc::new(PgDistanceCache::new(store.pool())) as DynDistanceCache,
                Arc::new(PgRouteRepository::new(store.pool())) as DynRouteRepository,
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, distances and routes are kept in memory");
            (
                Arc::new(InMemoryDistanceCache::new()) as DynDistanceCache,
                Arc::new(InMemoryRouteRepository::new()) as DynRouteRepository,
            )
        }
    };

    let (distance_client, geocoder): (DynDistanceMatrixClient, Option<DynGeocoder>) =
        match &config.google_maps_api_key {
            Some(key) => (
                Arc::new(HttpDistanceMatrixClient::new(
                    &config.google_maps_api_base,
                    key.clone(),
                )) as DynDistanceMatrixClient,
                Some(Arc::new(CachedGeocoder::new(Arc::new(HttpGeocoder::new(
                    &config.google_maps_api_base,
                    key.clone(),
                )))) as DynGeocoder),
            ),
            None => {
                tracing::warn!("GOOGLE_MAPS_API_KEY not set, using fixed distances");
                (
                    Arc::new(FixedDistanceMatrixClient::default()) as DynDistanceMatrixClient,
                    None,
                )
            }
        };

    let engine = Engine::new(
        Arc::new(optimizer),
        CachedDistanceService::new(cache, distance_client),
        routes,
        geocoder,
    );

    serve(Arc::new(engine) as DynAPI, config.listen_addr).await
}
