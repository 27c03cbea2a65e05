use axum::extract::{Extension, Json, Query};
use serde::Deserialize;

use crate::api::DynAPI;
use crate::entities::Coordinates;
use crate::error::Error;

#[derive(Deserialize)]
pub struct GeocodeParams {
    address: String,
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Query(params): Query<GeocodeParams>,
) -> Result<Json<Coordinates>, Error> {
    let coordinates = api.geocode(params.address).await?;

    Ok(coordinates.into())
}
