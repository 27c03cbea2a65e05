use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{
    DistanceMetrics, OptimizationDiagnostics, OptimizationResult, OptimizedPlan, OrderedStop,
    RouteOptimizationOptions, Stop,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAlgorithm {
    Optimizer,
    NearestNeighbor,
}

/// A saved optimization, as kept in the route history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub route_id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub algorithm: RouteAlgorithm,
    pub origin: Stop,
    pub ordered_stops: Vec<OrderedStop>,
    pub total_distance_m: u64,
    pub total_duration_s: u64,
    pub params_digest: String,
    pub options: Option<RouteOptimizationOptions>,
    pub diagnostics: OptimizationDiagnostics,
    pub distance_cache: DistanceMetrics,
}

impl RouteRecord {
    pub fn new(
        user_id: String,
        origin: Stop,
        options: Option<RouteOptimizationOptions>,
        params_digest: String,
        result: &OptimizationResult,
        distance_cache: DistanceMetrics,
    ) -> Self {
        let OptimizedPlan { route_id, plan } = &result.plan;
        let algorithm = if result.diagnostics.fallback_used {
            RouteAlgorithm::NearestNeighbor
        } else {
            RouteAlgorithm::Optimizer
        };

        Self {
            route_id: *route_id,
            user_id,
            // microseconds, as Postgres stores them, so cursors round-trip
            created_at: Utc::now().trunc_subsecs(6),
            algorithm,
            origin,
            ordered_stops: plan.ordered_stops.clone(),
            total_distance_m: plan.total_distance_m,
            total_duration_s: plan.total_duration_s,
            params_digest,
            options,
            diagnostics: result.diagnostics.clone(),
            distance_cache,
        }
    }

    pub fn destination_count(&self) -> usize {
        self.ordered_stops.len().saturating_sub(1)
    }

    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            route_id: self.route_id,
            created_at: self.created_at,
            algorithm: self.algorithm,
            destination_count: self.destination_count(),
            total_distance_m: self.total_distance_m,
            total_duration_s: self.total_duration_s,
            params_digest: self.params_digest.clone(),
            diagnostics: self.diagnostics.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub route_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub algorithm: RouteAlgorithm,
    pub destination_count: usize,
    pub total_distance_m: u64,
    pub total_duration_s: u64,
    pub params_digest: String,
    pub diagnostics: OptimizationDiagnostics,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePage {
    pub routes: Vec<RouteSummary>,
    pub next_cursor: Option<DateTime<Utc>>,
}
