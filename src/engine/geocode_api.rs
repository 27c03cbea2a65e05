use async_trait::async_trait;

use super::Engine;
use crate::{
    api::GeocodeAPI,
    entities::Coordinates,
    error::{invalid_input_error, upstream_error, Error},
};

#[async_trait]
impl GeocodeAPI for Engine {
    #[tracing::instrument(name = "Engine::geocode", skip(self))]
    async fn geocode(&self, address: String) -> Result<Coordinates, Error> {
        let address = address.trim();
        if address.is_empty() {
            return Err(invalid_input_error());
        }

        let geocoder = self.geocoder.as_ref().ok_or_else(|| {
            tracing::warn!("geocode requested but no geocoder is configured");
            upstream_error()
        })?;

        Ok(geocoder.geocode(address).await?)
    }
}
