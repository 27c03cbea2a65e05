use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Url,
};

use super::{
    contract::{OptimizerRequest, OptimizerResponse},
    error::OptimizerClientError,
    wire::{WireRequest, WireResponse},
};
use crate::{
    error::{config_error, Error},
    external::retry::{with_retry, RetryPolicy},
    validation::Validate,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RETRY_DELAYS_MS: [u64; 3] = [1_000, 2_000, 4_000];
pub const DEFAULT_ENDPOINT: &str = "/optimize";

#[async_trait]
pub trait OptimizerClient {
    async fn optimize(
        &self,
        request: &OptimizerRequest,
    ) -> Result<OptimizerResponse, OptimizerClientError>;
}

pub type DynOptimizerClient = Arc<dyn OptimizerClient + Send + Sync>;

#[derive(Clone, Debug)]
pub struct OptimizerClientConfig {
    pub base_url: String,
    /// Resolved against `base_url` with URL semantics, so a leading `/`
    /// replaces the base path.
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
    pub retry_delays: Vec<Duration>,
}

impl OptimizerClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            headers: vec![],
            timeout: DEFAULT_TIMEOUT,
            retry_delays: DEFAULT_RETRY_DELAYS_MS
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

pub struct HttpOptimizerClient {
    http: reqwest::Client,
    url: Url,
    headers: HeaderMap,
    policy: RetryPolicy,
}

impl HttpOptimizerClient {
    pub fn new(config: OptimizerClientConfig) -> Result<Self, Error> {
        let url = Url::parse(&config.base_url)
            .and_then(|base| base.join(&config.endpoint))
            .map_err(|_| config_error("OPTIMIZER_SERVICE_URL"))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| config_error("optimizer header name"))?;
            let value =
                HeaderValue::from_str(value).map_err(|_| config_error("optimizer header value"))?;
            headers.insert(name, value);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            url,
            headers,
            policy: RetryPolicy::new(config.timeout, config.retry_delays),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// One POST. Resolves to the raw body of a 2xx response.
    async fn send(&self, body: String, attempt: u32) -> Result<String, OptimizerClientError> {
        let res = self
            .http
            .post(self.url.clone())
            .headers(self.headers.clone())
            .body(body)
            .send()
            .await
            .map_err(|err| OptimizerClientError::network(err, attempt))?;

        let status = res.status();
        if !status.is_success() {
            return Err(OptimizerClientError::from_status(status.as_u16(), attempt));
        }

        res.text()
            .await
            .map_err(|err| OptimizerClientError::network(err, attempt))
    }
}

fn decode_response(raw: &str) -> Result<OptimizerResponse, OptimizerClientError> {
    let wire: WireResponse = serde_json::from_str(raw).map_err(|err| {
        OptimizerClientError::decode(format!("failed to parse optimizer response: {}", err))
    })?;

    wire.validate().map_err(|details| {
        OptimizerClientError::decode("optimizer response did not match the contract")
            .with_details(details)
    })?;

    let response = OptimizerResponse::from(wire);
    response.validate().map_err(|details| {
        OptimizerClientError::decode("optimizer returned an inconsistent plan").with_details(details)
    })?;

    Ok(response)
}

#[async_trait]
impl OptimizerClient for HttpOptimizerClient {
    #[tracing::instrument(skip_all, fields(url = %self.url, destinations = request.destinations.len()))]
    async fn optimize(
        &self,
        request: &OptimizerRequest,
    ) -> Result<OptimizerResponse, OptimizerClientError> {
        request.validate().map_err(|details| {
            OptimizerClientError::decode("optimizer request did not match the contract")
                .with_details(details)
        })?;

        let body = serde_json::to_string(&WireRequest::from(request)).map_err(|err| {
            OptimizerClientError::decode(format!("failed to encode optimizer request: {}", err))
        })?;

        let raw = with_retry("optimizer", &self.policy, |attempt| {
            self.send(body.clone(), attempt)
        })
        .await?;

        let response = decode_response(&raw)?;
        tracing::debug!(
            route_id = %response.route_id,
            gap = response.diagnostics.gap,
            "optimizer responded"
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::OptimizerOptions;
    use crate::external::optimizer::OptimizerErrorCode;
    use crate::test_support::{
        optimizer_wire_response, spawn_stub, tokyo_destinations, tokyo_origin,
    };
    use axum::{http::StatusCode, routing::post, Json, Router};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    fn request() -> OptimizerRequest {
        OptimizerRequest::new(
            tokyo_origin().coordinates(),
            tokyo_destinations(),
            OptimizerOptions::default(),
        )
    }

    fn client(base_url: String, delays_ms: &[u64], timeout_ms: u64) -> HttpOptimizerClient {
        let config = OptimizerClientConfig::new(base_url)
            .timeout(Duration::from_millis(timeout_ms))
            .retry_delays(delays_ms.iter().copied().map(Duration::from_millis).collect());
        HttpOptimizerClient::new(config).unwrap()
    }

    fn failing(status: StatusCode, hits: Arc<AtomicU32>) -> Router {
        Router::new().route(
            "/optimize",
            post(move || {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    status
                }
            }),
        )
    }

    #[test]
    fn endpoint_resolves_against_base_url() {
        let client = client("http://optimizer.internal/api/".into(), &[], 100);

        assert_eq!(client.url().as_str(), "http://optimizer.internal/optimize");
    }

    #[tokio::test]
    async fn decodes_a_healthy_response() {
        let router = Router::new().route(
            "/optimize",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["options"]["max_iterations"], 4000);
                Json(optimizer_wire_response(0.08, false))
            }),
        );
        let addr = spawn_stub(router).await;

        let response = assert_ok!(client(format!("http://{}", addr), &[], 1_000)
            .optimize(&request())
            .await);

        assert_eq!(response.plan.visit_order, vec!["tokyo-tower", "sensoji", "skytree"]);
        assert_eq!(response.diagnostics.gap, 0.08);
    }

    #[tokio::test]
    async fn retries_server_errors_then_gives_up() {
        let hits = Arc::new(AtomicU32::new(0));
        let addr = spawn_stub(failing(StatusCode::INTERNAL_SERVER_ERROR, hits.clone())).await;
        let started = Instant::now();

        let err = assert_err!(client(format!("http://{}", addr), &[10, 20], 1_000)
            .optimize(&request())
            .await);

        let elapsed = started.elapsed();
        assert_eq!(err.code, OptimizerErrorCode::Http5xx);
        assert_eq!(err.status, Some(500));
        assert_eq!(err.attempt, Some(3));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert!(elapsed >= Duration::from_millis(30));
        assert!(elapsed < Duration::from_millis(1_000));
    }

    #[tokio::test]
    async fn client_errors_fail_immediately() {
        let hits = Arc::new(AtomicU32::new(0));
        let addr = spawn_stub(failing(StatusCode::BAD_REQUEST, hits.clone())).await;

        let err = assert_err!(client(format!("http://{}", addr), &[10, 20], 1_000)
            .optimize(&request())
            .await);

        assert_eq!(err.code, OptimizerErrorCode::Http4xx);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn too_many_requests_is_retried() {
        let hits = Arc::new(AtomicU32::new(0));
        let addr = spawn_stub(failing(StatusCode::TOO_MANY_REQUESTS, hits.clone())).await;

        let err = assert_err!(client(format!("http://{}", addr), &[5], 1_000)
            .optimize(&request())
            .await);

        assert_eq!(err.status, Some(429));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn slow_engine_times_out() {
        let router = Router::new().route(
            "/optimize",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(optimizer_wire_response(0.08, false))
            }),
        );
        let addr = spawn_stub(router).await;

        let err = assert_err!(client(format!("http://{}", addr), &[], 50)
            .optimize(&request())
            .await);

        assert_eq!(err.code, OptimizerErrorCode::Timeout);
        assert_eq!(err.attempt, Some(1));
    }

    #[tokio::test]
    async fn contract_violations_are_decode_errors() {
        let router = Router::new().route(
            "/optimize",
            post(|| async {
                let mut body = optimizer_wire_response(0.08, false);
                body["route_id"] = "not-a-uuid".into();
                Json(body)
            }),
        );
        let addr = spawn_stub(router).await;

        let err = assert_err!(client(format!("http://{}", addr), &[10], 1_000)
            .optimize(&request())
            .await);

        assert_eq!(err.code, OptimizerErrorCode::Decode);
    }

    #[tokio::test]
    async fn inconsistent_plans_are_decode_errors() {
        let router = Router::new().route(
            "/optimize",
            post(|| async {
                let mut body = optimizer_wire_response(0.08, false);
                body["total_distance_m"] = serde_json::json!(1);
                Json(body)
            }),
        );
        let addr = spawn_stub(router).await;

        let err = assert_err!(client(format!("http://{}", addr), &[], 1_000)
            .optimize(&request())
            .await);

        assert_eq!(err.code, OptimizerErrorCode::Decode);
        assert!(err.details.is_some());
    }

    #[tokio::test]
    async fn invalid_requests_are_never_sent() {
        let hits = Arc::new(AtomicU32::new(0));
        let addr = spawn_stub(failing(StatusCode::OK, hits.clone())).await;
        let mut bad = request();
        bad.destinations.clear();

        let err = assert_err!(client(format!("http://{}", addr), &[], 1_000)
            .optimize(&bad)
            .await);

        assert_eq!(err.code, OptimizerErrorCode::Decode);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unreachable_engine_is_a_network_error() {
        let err = assert_err!(client("http://127.0.0.1:1".into(), &[], 1_000)
            .optimize(&request())
            .await);

        assert_eq!(err.code, OptimizerErrorCode::Network);
    }
}
