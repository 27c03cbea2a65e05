use axum::extract::{Extension, Json, Path, Query};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::DynAPI;
use crate::entities::{OptimizedRoute, RouteOptimizeInput, RoutePage, RouteRecord};
use crate::error::Error;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeParams {
    user_id: Option<String>,
    #[serde(flatten)]
    input: RouteOptimizeInput,
}

pub async fn optimize(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<OptimizeParams>,
) -> Result<Json<OptimizedRoute>, Error> {
    let route = api.optimize_route(params.user_id, params.input).await?;

    Ok(route.into())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    user_id: String,
    limit: Option<i64>,
    cursor: Option<DateTime<Utc>>,
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    Query(params): Query<ListParams>,
) -> Result<Json<RoutePage>, Error> {
    let page = api
        .list_routes(params.user_id, params.limit, params.cursor)
        .await?;

    Ok(page.into())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindParams {
    user_id: String,
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<Uuid>,
    Query(params): Query<FindParams>,
) -> Result<Json<RouteRecord>, Error> {
    let route = api.find_route(params.user_id, id).await?;

    Ok(route.into())
}
