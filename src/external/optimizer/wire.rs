//! The optimizer's snake_case wire contract and its mapping to the
//! in-process types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::contract::{DistanceMatrix, OptimizerRequest, OptimizerResponse};
use crate::entities::{
    Coordinates, Diagnostics, OptimizerOptions, OrderedStop, RoutePlan, Stop, Strategy,
};
use crate::planning::round_metric;
use crate::validation::{field, index, Issues, Validate};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireOptions {
    pub strategy: Strategy,
    pub max_iterations: u32,
    pub max_runtime_seconds: u32,
    pub fallback_tolerance: f64,
}

impl From<&OptimizerOptions> for WireOptions {
    fn from(options: &OptimizerOptions) -> Self {
        Self {
            strategy: options.strategy,
            max_iterations: options.max_iterations,
            max_runtime_seconds: options.max_runtime_seconds,
            fallback_tolerance: options.fallback_tolerance,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireRequest {
    pub origin: Coordinates,
    pub destinations: Vec<Stop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_matrix: Option<DistanceMatrix>,
    pub options: WireOptions,
}

impl From<&OptimizerRequest> for WireRequest {
    fn from(request: &OptimizerRequest) -> Self {
        Self {
            origin: request.origin,
            destinations: request.destinations.clone(),
            distance_matrix: request.distance_matrix.clone(),
            options: WireOptions::from(&request.options),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireOrderedStop {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub sequence: u32,
    pub distance_from_previous_m: f64,
    pub duration_from_previous_s: f64,
    pub cumulative_distance_m: f64,
    pub cumulative_duration_s: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireDiagnostics {
    pub strategy: Strategy,
    pub solver: String,
    pub iterations: u64,
    pub gap: f64,
    pub fallback_used: bool,
    pub execution_ms: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireResponse {
    pub route_id: Uuid,
    pub visit_order: Vec<String>,
    pub ordered_stops: Vec<WireOrderedStop>,
    pub total_distance_m: f64,
    pub total_duration_s: f64,
    pub diagnostics: WireDiagnostics,
}

impl Validate for WireResponse {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        let order_path = field(path, "visit_order");
        for (idx, id) in self.visit_order.iter().enumerate() {
            issues.check_non_empty(id, &index(&order_path, idx));
        }

        let stops_path = field(path, "ordered_stops");
        issues.check(
            !self.ordered_stops.is_empty(),
            &stops_path,
            "must contain at least one stop",
        );
        for (idx, stop) in self.ordered_stops.iter().enumerate() {
            let stop_path = index(&stops_path, idx);
            issues.check_non_empty(&stop.id, &field(&stop_path, "id"));
            Coordinates::new(stop.lat, stop.lng).collect_issues(&stop_path, issues);
            for (name, value) in [
                ("distance_from_previous_m", stop.distance_from_previous_m),
                ("duration_from_previous_s", stop.duration_from_previous_s),
                ("cumulative_distance_m", stop.cumulative_distance_m),
                ("cumulative_duration_s", stop.cumulative_duration_s),
            ] {
                issues.check_non_negative(value, &field(&stop_path, name));
            }
        }

        issues.check_non_negative(self.total_distance_m, &field(path, "total_distance_m"));
        issues.check_non_negative(self.total_duration_s, &field(path, "total_duration_s"));

        let diagnostics_path = field(path, "diagnostics");
        issues.check_non_empty(
            &self.diagnostics.solver,
            &field(&diagnostics_path, "solver"),
        );
        issues.check_range(
            self.diagnostics.gap,
            0.0,
            1.0,
            &field(&diagnostics_path, "gap"),
        );
        issues.check_non_negative(
            self.diagnostics.execution_ms,
            &field(&diagnostics_path, "execution_ms"),
        );
    }
}

impl From<WireDiagnostics> for Diagnostics {
    fn from(wire: WireDiagnostics) -> Self {
        Self {
            strategy: wire.strategy,
            solver: wire.solver,
            iterations: wire.iterations,
            gap: wire.gap,
            fallback_used: wire.fallback_used,
            execution_ms: wire.execution_ms,
        }
    }
}

impl From<WireOrderedStop> for OrderedStop {
    fn from(wire: WireOrderedStop) -> Self {
        Self {
            id: wire.id,
            label: wire.label,
            lat: wire.lat,
            lng: wire.lng,
            sequence: wire.sequence,
            distance_from_previous_m: round_metric(wire.distance_from_previous_m),
            duration_from_previous_s: round_metric(wire.duration_from_previous_s),
            cumulative_distance_m: round_metric(wire.cumulative_distance_m),
            cumulative_duration_s: round_metric(wire.cumulative_duration_s),
        }
    }
}

impl From<WireResponse> for OptimizerResponse {
    fn from(wire: WireResponse) -> Self {
        Self {
            route_id: wire.route_id,
            plan: RoutePlan {
                visit_order: wire.visit_order,
                ordered_stops: wire.ordered_stops.into_iter().map(Into::into).collect(),
                total_distance_m: round_metric(wire.total_distance_m),
                total_duration_s: round_metric(wire.total_duration_s),
            },
            diagnostics: wire.diagnostics.into(),
        }
    }
}
