use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{FeatureCollection, OptimizationDiagnostics, RouteOptimizationOptions, RoutePlan, Stop};
use crate::validation::{field, index, Issues, Validate};

pub const MAX_DESTINATIONS: usize = 30;

/// What a caller submits to have a tour optimized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOptimizeInput {
    pub origin: Stop,
    pub destinations: Vec<Stop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RouteOptimizationOptions>,
}

impl Validate for RouteOptimizeInput {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        self.origin.collect_issues(&field(path, "origin"), issues);

        let destinations_path = field(path, "destinations");
        issues.check(
            (1..=MAX_DESTINATIONS).contains(&self.destinations.len()),
            &destinations_path,
            format!("must contain between 1 and {} stops", MAX_DESTINATIONS),
        );
        for (idx, stop) in self.destinations.iter().enumerate() {
            stop.collect_issues(&index(&destinations_path, idx), issues);
        }

        self.options.collect_issues(&field(path, "options"), issues);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedPlan {
    pub route_id: Uuid,
    #[serde(flatten)]
    pub plan: RoutePlan,
}

/// The outcome of one optimization request. Built once, never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub plan: OptimizedPlan,
    pub geo_json: FeatureCollection,
    pub diagnostics: OptimizationDiagnostics,
}

/// What the HTTP surface returns for an optimization: the result plus the
/// digest of the request that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedRoute {
    #[serde(flatten)]
    pub result: OptimizationResult,
    pub params_digest: String,
}

impl Validate for OptimizationResult {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        self.plan.plan.collect_issues(&field(path, "plan"), issues);
        self.geo_json.collect_issues(&field(path, "geoJson"), issues);
        self.diagnostics
            .collect_issues(&field(path, "diagnostics"), issues);
    }
}
