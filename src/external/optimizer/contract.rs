use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{
    Coordinates, Diagnostics, OptimizerOptions, RoutePlan, Stop, MAX_DESTINATIONS,
};
use crate::validation::{field, index, Issues, Validate};

/// Precomputed leg costs. Row/column 0 is the origin, then destinations in
/// request order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    pub meters: Vec<Vec<f64>>,
    pub seconds: Vec<Vec<f64>>,
}

fn check_square(matrix: &[Vec<f64>], path: &str, issues: &mut Issues) {
    if matrix.is_empty() {
        issues.push(path, "must contain at least one row");
        return;
    }

    let columns = matrix[0].len();
    for (row_idx, row) in matrix.iter().enumerate() {
        let row_path = index(path, row_idx);
        issues.check(!row.is_empty(), &row_path, "must contain at least one value");
        issues.check(
            row.len() == columns,
            &row_path,
            "all rows in the matrix must have the same length",
        );
        for (col_idx, value) in row.iter().enumerate() {
            issues.check_non_negative(*value, &index(&row_path, col_idx));
        }
    }

    issues.check(
        columns == matrix.len(),
        path,
        "matrix must be square (rows == columns)",
    );
}

impl Validate for DistanceMatrix {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        let seconds_path = field(path, "seconds");
        check_square(&self.meters, &field(path, "meters"), issues);
        check_square(&self.seconds, &seconds_path, issues);

        if self.meters.len() != self.seconds.len() {
            issues.push(path, "meters and seconds must have the same dimensions");
            return;
        }
        for (row_idx, (meters, seconds)) in self.meters.iter().zip(&self.seconds).enumerate() {
            issues.check(
                meters.len() == seconds.len(),
                &index(&seconds_path, row_idx),
                "meters and seconds rows must have the same length",
            );
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerRequest {
    pub origin: Coordinates,
    pub destinations: Vec<Stop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_matrix: Option<DistanceMatrix>,
    #[serde(default)]
    pub options: OptimizerOptions,
}

impl OptimizerRequest {
    pub fn new(origin: Coordinates, destinations: Vec<Stop>, options: OptimizerOptions) -> Self {
        Self {
            origin,
            destinations,
            distance_matrix: None,
            options,
        }
    }
}

impl Validate for OptimizerRequest {
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

        self.distance_matrix
            .collect_issues(&field(path, "distanceMatrix"), issues);
        self.options.collect_issues(&field(path, "options"), issues);
    }
}

/// A solved tour as reported by the optimization engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerResponse {
    pub route_id: Uuid,
    #[serde(flatten)]
    pub plan: RoutePlan,
    pub diagnostics: Diagnostics,
}

impl Validate for OptimizerResponse {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        self.plan.collect_issues(path, issues);
        self.diagnostics
            .collect_issues(&field(path, "diagnostics"), issues);
    }
}
