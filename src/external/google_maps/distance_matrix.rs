use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;

use super::{api_base_url, GoogleMapsError, GoogleMapsErrorCode};
use crate::{
    entities::{DistanceRequest, DistanceResponse, DistanceSource, Freshness},
    external::retry::{with_retry, RetryPolicy},
};

pub const PROVIDER: &str = "google_distance_matrix";
pub const FIXED_PROVIDER: &str = "google_distance_matrix_mock";
pub const CACHE_TTL_HOURS: i64 = 24;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_RETRY_DELAYS_MS: [u64; 3] = [1_000, 4_000, 10_000];

#[async_trait]
pub trait DistanceMatrixClient {
    async fn fetch_distance(
        &self,
        request: &DistanceRequest,
    ) -> Result<DistanceResponse, GoogleMapsError>;
}

pub type DynDistanceMatrixClient = Arc<dyn DistanceMatrixClient + Send + Sync>;

fn fetched(provider: &str, distance_meters: u64, duration_seconds: u64) -> DistanceResponse {
    let requested_at = Utc::now();

    DistanceResponse {
        distance_meters,
        duration_seconds,
        freshness: Freshness::Fetched,
        provider: provider.to_string(),
        requested_at,
        expires_at: requested_at + Duration::hours(CACHE_TTL_HOURS),
        source: DistanceSource::Api,
    }
}

#[derive(Debug, Deserialize)]
struct MatrixValue {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MatrixValue>,
    duration: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

impl MatrixResponse {
    /// Maps provider statuses onto error codes and pulls out the single
    /// origin/destination element.
    fn into_metrics(self) -> Result<(u64, u64), GoogleMapsError> {
        let detail = self.error_message.unwrap_or_else(|| self.status.clone());

        match self.status.as_str() {
            "OK" => {}
            "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => {
                return Err(GoogleMapsError::new(
                    GoogleMapsErrorCode::RateLimit,
                    format!("rate limit exceeded: {}", detail),
                ))
            }
            "INVALID_REQUEST" | "REQUEST_DENIED" | "MAX_ELEMENTS_EXCEEDED" => {
                return Err(GoogleMapsError::new(
                    GoogleMapsErrorCode::InvalidRequest,
                    format!("invalid request: {}", detail),
                ))
            }
            other => {
                return Err(GoogleMapsError::new(
                    GoogleMapsErrorCode::ServerError,
                    format!("api error: {} - {}", other, detail),
                ))
            }
        }

        let element = self
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next());

        let element = match element {
            Some(element) if element.status == "OK" => element,
            Some(element) => {
                return Err(GoogleMapsError::new(
                    GoogleMapsErrorCode::NotFound,
                    format!("no route found: {}", element.status),
                ))
            }
            None => {
                return Err(GoogleMapsError::new(
                    GoogleMapsErrorCode::NotFound,
                    "no route found: UNKNOWN",
                ))
            }
        };

        match (element.distance, element.duration) {
            (Some(distance), Some(duration)) => Ok((
                distance.value.max(0.0).round() as u64,
                duration.value.max(0.0).round() as u64,
            )),
            _ => Err(GoogleMapsError::new(
                GoogleMapsErrorCode::InvalidRequest,
                "missing distance or duration in response",
            )),
        }
    }
}

pub struct HttpDistanceMatrixClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    policy: RetryPolicy,
}

impl HttpDistanceMatrixClient {
    pub fn new(api_base: &str, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: format!("{}/maps/api/distancematrix/json", api_base_url(api_base)),
            api_key: api_key.into(),
            policy: RetryPolicy::from_millis(DEFAULT_TIMEOUT_MS, &DEFAULT_RETRY_DELAYS_MS),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn query(&self, request: &DistanceRequest) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("origins", String::from(request.origin)),
            ("destinations", String::from(request.destination)),
            ("mode", request.mode().as_str().to_string()),
            ("key", self.api_key.clone()),
        ];

        if let Some(options) = &request.options {
            if let Some(traffic_model) = options.traffic_model {
                query.push(("traffic_model", traffic_model.as_str().to_string()));
            }
            if let Some(unit_system) = options.unit_system {
                query.push(("units", unit_system.as_str().to_string()));
            }
        }

        if let Some(departure_time) = request.departure_time {
            query.push(("departure_time", departure_time.timestamp().to_string()));
        }

        query
    }

    async fn attempt(
        &self,
        query: &[(&'static str, String)],
        attempt: u32,
    ) -> Result<(u64, u64), GoogleMapsError> {
        let res = self
            .http
            .get(&self.url)
            .query(query)
            .send()
            .await
            .map_err(|err| GoogleMapsError::transport(err, attempt))?;

        let status_code = res.status().as_u16();

        if (400..500).contains(&status_code) {
            return Err(GoogleMapsError::new(
                GoogleMapsErrorCode::InvalidRequest,
                format!("google api returned {}", status_code),
            )
            .with_status(status_code)
            .with_attempt(attempt));
        } else if status_code != 200 {
            return Err(GoogleMapsError::new(
                GoogleMapsErrorCode::ServerError,
                format!("google api server error: {}", status_code),
            )
            .with_status(status_code)
            .with_attempt(attempt));
        }

        let data: MatrixResponse = res
            .json()
            .await
            .map_err(|err| GoogleMapsError::transport(err, attempt))?;

        data.into_metrics().map_err(|err| err.with_attempt(attempt))
    }
}

#[async_trait]
impl DistanceMatrixClient for HttpDistanceMatrixClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_distance(
        &self,
        request: &DistanceRequest,
    ) -> Result<DistanceResponse, GoogleMapsError> {
        let query = self.query(request);

        let (distance_meters, duration_seconds) =
            with_retry("google_distance_matrix", &self.policy, |attempt| {
                self.attempt(&query, attempt)
            })
            .await?;

        Ok(fetched(PROVIDER, distance_meters, duration_seconds))
    }
}

/// Answers every lookup with the same distance. Stands in for the real
/// provider when no API key is configured.
#[derive(Clone, Debug)]
pub struct FixedDistanceMatrixClient {
    pub distance_meters: u64,
    pub duration_seconds: u64,
}

impl Default for FixedDistanceMatrixClient {
    fn default() -> Self {
        Self {
            distance_meters: 5_000,
            duration_seconds: 600,
        }
    }
}

#[async_trait]
impl DistanceMatrixClient for FixedDistanceMatrixClient {
    async fn fetch_distance(
        &self,
        _request: &DistanceRequest,
    ) -> Result<DistanceResponse, GoogleMapsError> {
        Ok(fetched(
            FIXED_PROVIDER,
            self.distance_meters,
            self.duration_seconds,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{distance_request, spawn_stub};
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    const PATH: &str = "/maps/api/distancematrix/json";

    fn single_element(status: &str) -> Value {
        json!({
            "destination_addresses": ["Destination Address"],
            "origin_addresses": ["Origin Address"],
            "rows": [{
                "elements": [{
                    "status": status,
                    "distance": { "text": "5.0 km", "value": 5000 },
                    "duration": { "text": "10 mins", "value": 600 }
                }]
            }],
            "status": "OK"
        })
    }

    fn client(addr: std::net::SocketAddr, delays_ms: &[u64]) -> HttpDistanceMatrixClient {
        HttpDistanceMatrixClient::new(&format!("http://{}", addr), "test-key")
            .with_policy(RetryPolicy::from_millis(1_000, delays_ms))
    }

    fn counting(hits: Arc<AtomicU32>, status: StatusCode, body: Value) -> Router {
        Router::new().route(
            PATH,
            get(move || {
                let hits = hits.clone();
                let body = body.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (status, Json(body))
                }
            }),
        )
    }

    #[tokio::test]
    async fn sends_query_and_reads_first_element() {
        let router = Router::new().route(
            PATH,
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params["origins"], "35.681236,139.767125");
                assert_eq!(params["mode"], "driving");
                assert_eq!(params["key"], "test-key");
                assert_eq!(params["departure_time"], "1731148320");
                Json(single_element("OK"))
            }),
        );
        let addr = spawn_stub(router).await;

        let response = assert_ok!(client(addr, &[]).fetch_distance(&distance_request()).await);

        assert_eq!(response.distance_meters, 5000);
        assert_eq!(response.duration_seconds, 600);
        assert_eq!(response.provider, PROVIDER);
        assert_eq!(response.freshness, Freshness::Fetched);
        assert_eq!(response.source, DistanceSource::Api);
        assert_eq!(
            response.expires_at - response.requested_at,
            Duration::hours(24)
        );
    }

    #[tokio::test]
    async fn server_errors_retry_with_delays() {
        let hits = Arc::new(AtomicU32::new(0));
        let addr = spawn_stub(counting(
            hits.clone(),
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({}),
        ))
        .await;
        let started = Instant::now();

        let err = assert_err!(client(addr, &[10, 20]).fetch_distance(&distance_request()).await);

        let elapsed = started.elapsed();
        assert_eq!(err.code, GoogleMapsErrorCode::ServerError);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert!(elapsed >= std::time::Duration::from_millis(30));
        assert!(elapsed < std::time::Duration::from_millis(1_000));
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let hits = Arc::new(AtomicU32::new(0));
        let addr = spawn_stub(counting(hits.clone(), StatusCode::FORBIDDEN, json!({}))).await;

        let err = assert_err!(client(addr, &[10, 20]).fetch_distance(&distance_request()).await);

        assert_eq!(err.code, GoogleMapsErrorCode::InvalidRequest);
        assert_eq!(err.status, Some(403));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_route_is_not_found() {
        let hits = Arc::new(AtomicU32::new(0));
        let body = json!({
            "rows": [{ "elements": [{ "status": "NOT_FOUND" }] }],
            "status": "OK"
        });
        let addr = spawn_stub(counting(hits.clone(), StatusCode::OK, body)).await;

        let err = assert_err!(client(addr, &[10]).fetch_distance(&distance_request()).await);

        assert_eq!(err.code, GoogleMapsErrorCode::NotFound);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn quota_errors_are_retried() {
        let hits = Arc::new(AtomicU32::new(0));
        let body = json!({
            "error_message": "You have exceeded your daily request quota for this API.",
            "status": "OVER_QUERY_LIMIT"
        });
        let addr = spawn_stub(counting(hits.clone(), StatusCode::OK, body)).await;

        let err = assert_err!(client(addr, &[5, 5]).fetch_distance(&distance_request()).await);

        assert_eq!(err.code, GoogleMapsErrorCode::RateLimit);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fixed_client_returns_its_distance() {
        let response = assert_ok!(
            FixedDistanceMatrixClient::default()
                .fetch_distance(&distance_request())
                .await
        );

        assert_eq!(response.distance_meters, 5_000);
        assert_eq!(response.duration_seconds, 600);
        assert_eq!(response.provider, FIXED_PROVIDER);
    }
}
