use axum::extract::{Extension, Json};
use axum::http::StatusCode;

use crate::api::DynAPI;
use crate::entities::{DistanceMetrics, DistanceRequest, DistanceResponse};
use crate::error::Error;

pub async fn lookup(
    Extension(api): Extension<DynAPI>,
    Json(request): Json<DistanceRequest>,
) -> Result<Json<DistanceResponse>, Error> {
    let distance = api.get_distance(request).await?;

    Ok(distance.into())
}

pub async fn metrics(Extension(api): Extension<DynAPI>) -> Result<Json<DistanceMetrics>, Error> {
    let metrics = api.distance_metrics().await?;

    Ok(metrics.into())
}

pub async fn reset_metrics(Extension(api): Extension<DynAPI>) -> Result<StatusCode, Error> {
    api.reset_distance_metrics().await?;

    Ok(StatusCode::NO_CONTENT)
}
