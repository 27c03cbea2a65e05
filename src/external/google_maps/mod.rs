//! Google Maps Platform clients: Distance Matrix and Geocoding.

mod distance_matrix;
mod geocoding;

pub use distance_matrix::{
    DistanceMatrixClient, DynDistanceMatrixClient, FixedDistanceMatrixClient,
    HttpDistanceMatrixClient, CACHE_TTL_HOURS, FIXED_PROVIDER, PROVIDER,
};
pub use geocoding::{DynGeocoder, Geocoder, HttpGeocoder};

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::external::retry::Retryable;

pub const DEFAULT_API_BASE: &str = "maps.googleapis.com";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoogleMapsErrorCode {
    InvalidRequest,
    RateLimit,
    ServerError,
    Network,
    NotFound,
    Timeout,
    Decode,
}

impl GoogleMapsErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::RateLimit => "RATE_LIMIT",
            Self::ServerError => "SERVER_ERROR",
            Self::Network => "NETWORK",
            Self::NotFound => "NOT_FOUND",
            Self::Timeout => "TIMEOUT",
            Self::Decode => "DECODE",
        }
    }
}

impl fmt::Display for GoogleMapsErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct GoogleMapsError {
    pub code: GoogleMapsErrorCode,
    pub message: String,
    pub status: Option<u16>,
    pub attempt: Option<u32>,
}

impl GoogleMapsError {
    pub fn new(code: GoogleMapsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            attempt: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    fn transport(err: reqwest::Error, attempt: u32) -> Self {
        let code = if err.is_timeout() {
            GoogleMapsErrorCode::Timeout
        } else if err.is_decode() {
            GoogleMapsErrorCode::Decode
        } else {
            GoogleMapsErrorCode::Network
        };

        Self::new(code, format!("google maps request failed: {}", err)).with_attempt(attempt)
    }
}

impl Retryable for GoogleMapsError {
    fn is_retryable(&self) -> bool {
        matches!(
            self.code,
            GoogleMapsErrorCode::ServerError
                | GoogleMapsErrorCode::RateLimit
                | GoogleMapsErrorCode::Network
                | GoogleMapsErrorCode::Timeout
        )
    }

    fn timed_out(attempt: u32, timeout: Duration) -> Self {
        Self::new(
            GoogleMapsErrorCode::Timeout,
            format!("google maps request timed out after {}ms", timeout.as_millis()),
        )
        .with_attempt(attempt)
    }
}

/// Accepts either a bare host (`maps.googleapis.com`) or a full base URL.
pub fn api_base_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.starts_with("http://") || base.starts_with("https://") {
        base.to_string()
    } else {
        format!("https://{}", base)
    }
}
