//! Fixtures and stubs shared by the unit tests.

use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    cache::InMemoryDistanceCache,
    distance_service::CachedDistanceService,
    engine::Engine,
    entities::{
        Coordinates, DistanceMetrics, DistanceRequest, DistanceResponse, DistanceSource, FallbackReason,
        Freshness, OptimizationDiagnostics, OptimizationResult, OptimizedPlan, RouteOptimizeInput,
        RouteRecord, Stop, TravelMode,
    },
    external::google_maps::FixedDistanceMatrixClient,
    external::optimizer::{
        OptimizerClient, OptimizerClientError, OptimizerRequest, OptimizerResponse, WireResponse,
    },
    planning::{compute_nearest_neighbor_plan, compute_route_params_digest, create_route_geojson},
    repository::InMemoryRouteRepository,
};

pub fn tokyo_origin() -> Stop {
    Stop::new("origin", Some("Tokyo Station"), 35.681236, 139.767125)
}

pub fn tokyo_destinations() -> Vec<Stop> {
    vec![
        Stop::new("tokyo-tower", Some("Tokyo Tower"), 35.65858, 139.745433),
        Stop::new("sensoji", Some("Sensoji Temple"), 35.714765, 139.796655),
        Stop::new("skytree", Some("Tokyo Skytree"), 35.710063, 139.8107),
    ]
}

pub fn optimize_input() -> RouteOptimizeInput {
    RouteOptimizeInput {
        origin: tokyo_origin(),
        destinations: tokyo_destinations(),
        options: None,
    }
}

/// Tokyo Station to Tokyo Tower, departing 2024-11-09T10:32:00Z.
pub fn distance_request() -> DistanceRequest {
    let mut request = DistanceRequest::new(
        Coordinates::new(35.681236, 139.767125),
        Coordinates::new(35.658581, 139.745438),
    );
    request.mode = Some(TravelMode::Driving);
    request.departure_time = Some(Utc.with_ymd_and_hms(2024, 11, 9, 10, 32, 0).unwrap());
    request
}

pub fn distance_response(expires_in: Duration) -> DistanceResponse {
    let now = Utc::now();
    DistanceResponse {
        distance_meters: 5000,
        duration_seconds: 600,
        freshness: Freshness::Fetched,
        provider: "google_distance_matrix".into(),
        requested_at: now,
        expires_at: now + expires_in,
        source: DistanceSource::Api,
    }
}

fn wire_stop(
    stop: &Stop,
    sequence: u32,
    leg: (f64, f64),
    cumulative: (f64, f64),
) -> Value {
    json!({
        "id": stop.id,
        "label": stop.label,
        "lat": stop.lat,
        "lng": stop.lng,
        "sequence": sequence,
        "distance_from_previous_m": leg.0,
        "duration_from_previous_s": leg.1,
        "cumulative_distance_m": cumulative.0,
        "cumulative_duration_s": cumulative.1,
    })
}

/// A healthy optimizer answer for the Tokyo tour, as it comes off the wire.
pub fn optimizer_wire_response(gap: f64, fallback_used: bool) -> Value {
    let origin = tokyo_origin();
    let destinations = tokyo_destinations();

    json!({
        "route_id": "c0a80157-0c5d-4ac6-996a-5af68e3b4235",
        "visit_order": ["tokyo-tower", "sensoji", "skytree"],
        "ordered_stops": [
            wire_stop(&origin, 0, (0.0, 0.0), (0.0, 0.0)),
            wire_stop(&destinations[0], 1, (3200.0, 950.0), (3200.0, 950.0)),
            wire_stop(&destinations[1], 2, (4200.0, 1250.0), (7400.0, 2200.0)),
            wire_stop(&destinations[2], 3, (1300.0, 450.0), (8700.0, 2650.0)),
        ],
        "total_distance_m": 8700,
        "total_duration_s": 2650,
        "diagnostics": {
            "strategy": "quality",
            "solver": "or-tools",
            "iterations": 3500,
            "gap": gap,
            "fallback_used": fallback_used,
            "execution_ms": 12876,
        },
    })
}

pub fn optimizer_response(gap: f64, fallback_used: bool) -> OptimizerResponse {
    let wire: WireResponse =
        serde_json::from_value(optimizer_wire_response(gap, fallback_used)).unwrap();
    wire.into()
}

/// A saved nearest-neighbor route for the Tokyo tour.
pub fn route_record(user_id: &str, created_at: DateTime<Utc>) -> RouteRecord {
    let origin = tokyo_origin();
    let destinations = tokyo_destinations();
    let plan = compute_nearest_neighbor_plan(&origin, &destinations);
    let result = OptimizationResult {
        geo_json: create_route_geojson(&plan),
        plan: OptimizedPlan {
            route_id: Uuid::new_v4(),
            plan,
        },
        diagnostics: OptimizationDiagnostics::fallback(
            FallbackReason::OptimizerError,
            None,
            None,
        ),
    };

    let mut record = RouteRecord::new(
        user_id.to_string(),
        origin.clone(),
        None,
        compute_route_params_digest(&origin, &destinations, None),
        &result,
        DistanceMetrics::default(),
    );
    record.created_at = created_at;
    record
}

/// An optimizer that always gives the same answer and counts its calls.
pub struct StubOptimizer {
    outcome: Result<OptimizerResponse, OptimizerClientError>,
    calls: AtomicU32,
}

impl StubOptimizer {
    pub fn responding(response: OptimizerResponse) -> Self {
        Self {
            outcome: Ok(response),
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing(err: OptimizerClientError) -> Self {
        Self {
            outcome: Err(err),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OptimizerClient for StubOptimizer {
    async fn optimize(
        &self,
        _request: &OptimizerRequest,
    ) -> Result<OptimizerResponse, OptimizerClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Serves `router` on an ephemeral local port.
pub async fn spawn_stub(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(router.into_make_service());
    tokio::spawn(server);
    addr
}

/// An engine wired to in-memory storage, a fixed distance provider and no
/// geocoder.
pub fn test_engine(optimizer: StubOptimizer) -> Engine {
    let distances = CachedDistanceService::new(
        Arc::new(InMemoryDistanceCache::new()),
        Arc::new(FixedDistanceMatrixClient::default()),
    );

    Engine::new(
        Arc::new(optimizer),
        distances,
        Arc::new(InMemoryRouteRepository::new()),
        None,
    )
}
