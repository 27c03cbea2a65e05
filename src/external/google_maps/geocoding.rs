use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;

use super::{api_base_url, GoogleMapsError, GoogleMapsErrorCode};
use crate::{
    entities::Coordinates,
    external::retry::{with_retry, RetryPolicy, Retryable},
};

const DEFAULT_TIMEOUT_MS: u64 = 6_000;
const DEFAULT_RETRY_DELAYS_MS: [u64; 2] = [500, 1_500];

#[async_trait]
pub trait Geocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GoogleMapsError>;
}

pub type DynGeocoder = Arc<dyn Geocoder + Send + Sync>;

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

/// Geocoding gives up on a timed out lookup instead of retrying it.
struct GeocodeAttemptError(GoogleMapsError);

impl fmt::Display for GeocodeAttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Retryable for GeocodeAttemptError {
    fn is_retryable(&self) -> bool {
        matches!(
            self.0.code,
            GoogleMapsErrorCode::RateLimit
                | GoogleMapsErrorCode::ServerError
                | GoogleMapsErrorCode::Network
        )
    }

    fn timed_out(attempt: u32, timeout: Duration) -> Self {
        Self(GoogleMapsError::timed_out(attempt, timeout))
    }
}

fn extract_coordinates(
    payload: GeocodeResponse,
    address: &str,
) -> Result<Coordinates, GoogleMapsError> {
    match payload.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => {
            return Err(GoogleMapsError::new(
                GoogleMapsErrorCode::NotFound,
                format!("could not locate \"{}\"", address),
            ))
        }
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => {
            return Err(GoogleMapsError::new(
                GoogleMapsErrorCode::RateLimit,
                format!("geocode rate limit exceeded for \"{}\"", address),
            ))
        }
        "REQUEST_DENIED" | "INVALID_REQUEST" => {
            return Err(GoogleMapsError::new(
                GoogleMapsErrorCode::InvalidRequest,
                payload
                    .error_message
                    .unwrap_or_else(|| format!("invalid geocode request for \"{}\"", address)),
            ))
        }
        other => {
            return Err(GoogleMapsError::new(
                GoogleMapsErrorCode::ServerError,
                payload
                    .error_message
                    .unwrap_or_else(|| format!("geocode failed with status {}", other)),
            ))
        }
    }

    payload
        .results
        .into_iter()
        .next()
        .map(|result| result.geometry.location)
        .ok_or_else(|| {
            GoogleMapsError::new(
                GoogleMapsErrorCode::ServerError,
                format!("missing coordinates in geocode response for \"{}\"", address),
            )
        })
}

pub struct HttpGeocoder {
    http: reqwest::Client,
    url: String,
    api_key: String,
    policy: RetryPolicy,
}

impl HttpGeocoder {
    pub fn new(api_base: &str, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: format!("{}/maps/api/geocode/json", api_base_url(api_base)),
            api_key: api_key.into(),
            policy: RetryPolicy::from_millis(DEFAULT_TIMEOUT_MS, &DEFAULT_RETRY_DELAYS_MS),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn attempt(&self, address: &str, attempt: u32) -> Result<Coordinates, GeocodeAttemptError> {
        let res = self
            .http
            .get(&self.url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|err| GeocodeAttemptError(GoogleMapsError::transport(err, attempt)))?;

        let status_code = res.status().as_u16();
        let code = match status_code {
            200..=299 => None,
            429 => Some(GoogleMapsErrorCode::RateLimit),
            500..=599 => Some(GoogleMapsErrorCode::ServerError),
            _ => Some(GoogleMapsErrorCode::InvalidRequest),
        };
        if let Some(code) = code {
            return Err(GeocodeAttemptError(
                GoogleMapsError::new(
                    code,
                    format!("geocode HTTP {} for \"{}\"", status_code, address),
                )
                .with_status(status_code)
                .with_attempt(attempt),
            ));
        }

        let payload: GeocodeResponse = res
            .json()
            .await
            .map_err(|err| GeocodeAttemptError(GoogleMapsError::transport(err, attempt)))?;

        extract_coordinates(payload, address)
            .map_err(|err| GeocodeAttemptError(err.with_attempt(attempt)))
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    #[tracing::instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Coordinates, GoogleMapsError> {
        with_retry("google_geocode", &self.policy, |attempt| {
            self.attempt(address, attempt)
        })
        .await
        .map_err(|GeocodeAttemptError(err)| err)
    }
}
