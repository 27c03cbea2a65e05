//! Greedy nearest-unvisited-stop tour construction.
//!
//! O(n²) in the number of destinations, which are capped well below the
//! point where that matters.

use crate::entities::{OrderedStop, RoutePlan, Stop};

use super::haversine::{estimate_duration, haversine_distance};

/// Rounds half-up and floors at zero.
pub(crate) fn round_metric(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// Builds a tour from `origin`, always moving to the closest remaining
/// destination. Ties go to the destination listed first.
pub fn compute_nearest_neighbor_plan(origin: &Stop, destinations: &[Stop]) -> RoutePlan {
    let mut remaining: Vec<&Stop> = destinations.iter().collect();
    let mut visit_order = Vec::with_capacity(destinations.len());
    let mut ordered_stops = Vec::with_capacity(destinations.len() + 1);
    ordered_stops.push(OrderedStop::origin(origin));

    let mut current = origin.coordinates();
    let mut cumulative_distance = 0.0;
    let mut cumulative_duration = 0.0;
    let mut sequence = 1;

    while !remaining.is_empty() {
        let mut closest_index = 0;
        let mut closest_distance = f64::INFINITY;

        for (idx, candidate) in remaining.iter().enumerate() {
            let distance = haversine_distance(&current, &candidate.coordinates());
            if distance < closest_distance {
                closest_distance = distance;
                closest_index = idx;
            }
        }

        let next = remaining.remove(closest_index);
        let leg_duration = estimate_duration(closest_distance);
        cumulative_distance += closest_distance;
        cumulative_duration += leg_duration;

        ordered_stops.push(OrderedStop {
            id: next.id.clone(),
            label: next.label.clone(),
            lat: next.lat,
            lng: next.lng,
            sequence,
            distance_from_previous_m: round_metric(closest_distance),
            duration_from_previous_s: round_metric(leg_duration),
            cumulative_distance_m: round_metric(cumulative_distance),
            cumulative_duration_s: round_metric(cumulative_duration),
        });

        visit_order.push(next.id.clone());
        current = next.coordinates();
        sequence += 1;
    }

    RoutePlan {
        visit_order,
        ordered_stops,
        total_distance_m: round_metric(cumulative_distance),
        total_duration_s: round_metric(cumulative_duration),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{tokyo_destinations, tokyo_origin};
    use crate::validation::Validate;

    #[test]
    fn visits_tokyo_sights_in_nearest_order() {
        let plan = compute_nearest_neighbor_plan(&tokyo_origin(), &tokyo_destinations());

        assert_eq!(plan.visit_order, vec!["tokyo-tower", "sensoji", "skytree"]);
    }

    #[test]
    fn is_deterministic() {
        let first = compute_nearest_neighbor_plan(&tokyo_origin(), &tokyo_destinations());
        let second = compute_nearest_neighbor_plan(&tokyo_origin(), &tokyo_destinations());

        assert_eq!(first, second);
    }

    #[test]
    fn plan_satisfies_invariants() {
        let plan = compute_nearest_neighbor_plan(&tokyo_origin(), &tokyo_destinations());

        assert_eq!(plan.ordered_stops.len(), plan.visit_order.len() + 1);
        let origin = &plan.ordered_stops[0];
        assert_eq!(origin.sequence, 0);
        assert_eq!(origin.cumulative_distance_m, 0);
        assert_eq!(origin.distance_from_previous_m, 0);
        assert_eq!(
            plan.total_distance_m,
            plan.ordered_stops.last().unwrap().cumulative_distance_m
        );
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn no_destinations_yields_origin_only() {
        let plan = compute_nearest_neighbor_plan(&tokyo_origin(), &[]);

        assert!(plan.visit_order.is_empty());
        assert_eq!(plan.ordered_stops.len(), 1);
        assert_eq!(plan.total_distance_m, 0);
        assert_eq!(plan.total_duration_s, 0);
    }

    #[test]
    fn ties_go_to_the_first_listed_stop() {
        let origin = Stop::new("o", None, 0.0, 0.0);
        let destinations = vec![
            Stop::new("east", None, 0.0, 1.0),
            Stop::new("west", None, 0.0, -1.0),
        ];

        let plan = compute_nearest_neighbor_plan(&origin, &destinations);

        assert_eq!(plan.visit_order, vec!["east", "west"]);
    }

    #[test]
    fn leg_metrics_are_rounded() {
        let origin = Stop::new("o", None, 0.0, 0.0);
        let destinations = vec![Stop::new("north", None, 1.0, 0.0)];

        let plan = compute_nearest_neighbor_plan(&origin, &destinations);

        // One degree of latitude is ~111,194.9 m, ~8,006 s at city speed.
        assert_eq!(plan.ordered_stops[1].distance_from_previous_m, 111_195);
        assert_eq!(plan.ordered_stops[1].duration_from_previous_s, 8_006);
    }

    #[test]
    fn round_metric_floors_at_zero() {
        assert_eq!(round_metric(-3.2), 0);
        assert_eq!(round_metric(2.5), 3);
        assert_eq!(round_metric(2.49), 2);
        assert_eq!(round_metric(f64::NAN), 0);
    }
}
