use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{
    Coordinates, DistanceMetrics, DistanceRequest, DistanceResponse, OptimizedRoute, RouteOptimizeInput,
    RoutePage, RouteRecord,
};
use crate::error::Error;

#[async_trait]
pub trait RouteAPI {
    /// Always yields a usable plan unless the input is invalid. When
    /// `user_id` is given the result is also saved to the route history.
    async fn optimize_route(
        &self,
        user_id: Option<String>,
        input: RouteOptimizeInput,
    ) -> Result<OptimizedRoute, Error>;

    async fn find_route(&self, user_id: String, route_id: Uuid) -> Result<RouteRecord, Error>;

    async fn list_routes(
        &self,
        user_id: String,
        limit: Option<i64>,
        cursor: Option<DateTime<Utc>>,
    ) -> Result<RoutePage, Error>;
}

#[async_trait]
pub trait DistanceAPI {
    async fn get_distance(&self, request: DistanceRequest) -> Result<DistanceResponse, Error>;
    async fn distance_metrics(&self) -> Result<DistanceMetrics, Error>;
    async fn reset_distance_metrics(&self) -> Result<(), Error>;
}

#[async_trait]
pub trait GeocodeAPI {
    async fn geocode(&self, address: String) -> Result<Coordinates, Error>;
}

pub trait API: RouteAPI + DistanceAPI + GeocodeAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
