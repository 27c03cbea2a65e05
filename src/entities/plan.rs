use serde::{Deserialize, Serialize};

use crate::entities::{Coordinates, Stop};
use crate::validation::{field, index, Issues, Validate};

/// A stop placed in a tour, with leg metrics relative to the previous stop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedStop {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub sequence: u32,
    pub distance_from_previous_m: u64,
    pub duration_from_previous_s: u64,
    pub cumulative_distance_m: u64,
    pub cumulative_duration_s: u64,
}

impl OrderedStop {
    /// The tour's starting point: sequence 0, every metric zero.
    pub fn origin(stop: &Stop) -> Self {
        Self {
            id: stop.id.clone(),
            label: stop.label.clone(),
            lat: stop.lat,
            lng: stop.lng,
            sequence: 0,
            distance_from_previous_m: 0,
            duration_from_previous_s: 0,
            cumulative_distance_m: 0,
            cumulative_duration_s: 0,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    /// Destination ids in visiting order; the origin is not included.
    pub visit_order: Vec<String>,
    /// Every stop including the origin at sequence 0.
    pub ordered_stops: Vec<OrderedStop>,
    pub total_distance_m: u64,
    pub total_duration_s: u64,
}

impl Validate for RoutePlan {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        let stops_path = field(path, "orderedStops");

        if self.ordered_stops.len() != self.visit_order.len() + 1 {
            issues.push(
                &stops_path,
                format!(
                    "expected {} stops for {} destinations, found {}",
                    self.visit_order.len() + 1,
                    self.visit_order.len(),
                    self.ordered_stops.len()
                ),
            );
        }

        let mut previous: Option<&OrderedStop> = None;
        for (idx, stop) in self.ordered_stops.iter().enumerate() {
            let stop_path = index(&stops_path, idx);
            issues.check_non_empty(&stop.id, &field(&stop_path, "id"));
            stop.coordinates().collect_issues(&stop_path, issues);

            if stop.sequence as usize != idx {
                issues.push(
                    &field(&stop_path, "sequence"),
                    format!("expected sequence {}", idx),
                );
            }

            match previous {
                None => issues.check(
                    stop.distance_from_previous_m == 0
                        && stop.duration_from_previous_s == 0
                        && stop.cumulative_distance_m == 0
                        && stop.cumulative_duration_s == 0,
                    &stop_path,
                    "origin metrics must all be zero",
                ),
                Some(prev) => issues.check(
                    stop.cumulative_distance_m >= prev.cumulative_distance_m
                        && stop.cumulative_duration_s >= prev.cumulative_duration_s,
                    &stop_path,
                    "cumulative metrics must not decrease",
                ),
            }
            previous = Some(stop);
        }

        for (idx, id) in self.visit_order.iter().enumerate() {
            let matches = self
                .ordered_stops
                .get(idx + 1)
                .map_or(false, |stop| &stop.id == id);
            issues.check(
                matches,
                &index(&field(path, "visitOrder"), idx),
                "must match the id of the stop at the same position",
            );
        }

        let last = self.ordered_stops.last();
        issues.check(
            last.map_or(false, |s| s.cumulative_distance_m == self.total_distance_m),
            &field(path, "totalDistanceM"),
            "must equal the last stop's cumulative distance",
        );
        issues.check(
            last.map_or(false, |s| s.cumulative_duration_s == self.total_duration_s),
            &field(path, "totalDurationS"),
            "must equal the last stop's cumulative duration",
        );
    }
}
