use async_trait::async_trait;

use super::Engine;
use crate::{
    api::DistanceAPI,
    entities::{DistanceMetrics, DistanceRequest, DistanceResponse},
    error::Error,
    validation::Validate,
};

#[async_trait]
impl DistanceAPI for Engine {
    #[tracing::instrument(name = "Engine::get_distance", skip(self))]
    async fn get_distance(&self, request: DistanceRequest) -> Result<DistanceResponse, Error> {
        request.validate()?;

        Ok(self.distances.get_distance(&request).await?)
    }

    async fn distance_metrics(&self) -> Result<DistanceMetrics, Error> {
        Ok(self.distances.get_metrics())
    }

    #[tracing::instrument(name = "Engine::reset_distance_metrics", skip(self))]
    async fn reset_distance_metrics(&self) -> Result<(), Error> {
        self.distances.reset_metrics();
        Ok(())
    }
}
