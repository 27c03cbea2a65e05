//! Request correlation: every request runs inside a span tagged with its id.

use std::time::Instant;

use axum::{
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The caller's `x-request-id` when it sent a non-empty one, a fresh UUID
/// otherwise.
pub fn request_id<B>(req: &Request<B>) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub async fn correlate<B>(req: Request<B>, next: Next<B>) -> Response {
    let id = request_id(&req);
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let span = tracing::info_span!("request", request_id = %id, %method, %path);

    let mut response = async move {
        let started = Instant::now();
        tracing::info!("request started");

        let response = next.run(req).await;

        let status = response.status();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), elapsed_ms, "request failed");
        } else if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), elapsed_ms, "request rejected");
        } else {
            tracing::info!(status = status.as_u16(), elapsed_ms, "request finished");
        }

        response
    }
    .instrument(span)
    .await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DynAPI;
    use crate::server::app;
    use crate::test_support::{optimizer_response, spawn_stub, test_engine, StubOptimizer};
    use std::sync::Arc;

    async fn base_url() -> String {
        let api: DynAPI = Arc::new(test_engine(StubOptimizer::responding(optimizer_response(
            0.08, false,
        ))));
        format!("http://{}", spawn_stub(app(api)).await)
    }

    #[test]
    fn incoming_request_id_is_kept() {
        let req = Request::builder()
            .uri("/routes")
            .header(REQUEST_ID_HEADER, "req-7f3a")
            .body(())
            .unwrap();

        assert_eq!(request_id(&req), "req-7f3a");
    }

    #[test]
    fn empty_request_id_is_replaced() {
        let req = Request::builder()
            .uri("/routes")
            .header(REQUEST_ID_HEADER, "")
            .body(())
            .unwrap();

        assert!(Uuid::parse_str(&request_id(&req)).is_ok());
    }

    #[tokio::test]
    async fn response_echoes_the_callers_request_id() {
        let base = base_url().await;

        let response = reqwest::Client::new()
            .get(format!("{}/distances/metrics", base))
            .header(REQUEST_ID_HEADER, "req-7f3a")
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-7f3a");
    }

    #[tokio::test]
    async fn request_without_id_gets_a_uuid() {
        let base = base_url().await;

        let response = reqwest::get(format!("{}/distances/metrics", base))
            .await
            .unwrap();

        let id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }
}
