use serde_json::Value as JsonValue;

use crate::entities::{Feature, FeatureCollection, Geometry, JsonObject, Position, RoutePlan};

fn feature(value: geojson::Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn properties<const N: usize>(entries: [(&str, JsonValue); N]) -> JsonObject {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Projects a plan onto GeoJSON: a Point per stop, then one LineString
/// through every stop in sequence order.
pub fn create_route_geojson(plan: &RoutePlan) -> FeatureCollection {
    let mut stops: Vec<_> = plan.ordered_stops.iter().collect();
    stops.sort_by_key(|stop| stop.sequence);

    let mut line: Vec<Position> = stops
        .iter()
        .map(|stop| stop.coordinates().lng_lat().to_vec())
        .collect();
    // A LineString needs two positions even for an origin-only plan.
    if let [only] = line.as_slice() {
        line.push(only.clone());
    }

    let mut features: Vec<Feature> = stops
        .iter()
        .map(|stop| {
            let mut props = properties([
                ("id", stop.id.clone().into()),
                ("sequence", stop.sequence.into()),
                ("cumulativeDistanceM", stop.cumulative_distance_m.into()),
                ("cumulativeDurationS", stop.cumulative_duration_s.into()),
            ]);
            if let Some(label) = &stop.label {
                props.insert("label".into(), label.clone().into());
            }

            feature(
                geojson::Value::Point(stop.coordinates().lng_lat().to_vec()),
                props,
            )
        })
        .collect();

    features.push(feature(
        geojson::Value::LineString(line),
        properties([
            ("totalDistanceM", plan.total_distance_m.into()),
            ("totalDurationS", plan.total_duration_s.into()),
        ]),
    ));

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::line_strings;
    use crate::planning::compute_nearest_neighbor_plan;
    use crate::test_support::{tokyo_destinations, tokyo_origin};
    use crate::validation::Validate;

    #[test]
    fn one_point_per_stop_plus_a_line() {
        let plan = compute_nearest_neighbor_plan(&tokyo_origin(), &tokyo_destinations());

        let collection = create_route_geojson(&plan);

        assert_eq!(collection.features.len(), 5);
        let lines: Vec<_> = line_strings(&collection).collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 4);
        assert_eq!(lines[0][0], vec![139.767125, 35.681236]);
        assert!(collection.validate().is_ok());
    }

    #[test]
    fn origin_only_plan_duplicates_the_position() {
        let plan = compute_nearest_neighbor_plan(&tokyo_origin(), &[]);

        let collection = create_route_geojson(&plan);

        let line = line_strings(&collection).next().unwrap();
        assert_eq!(line.len(), 2);
        assert_eq!(line[0], line[1]);
        assert!(collection.validate().is_ok());
    }

    #[test]
    fn points_follow_sequence_order() {
        let mut plan = compute_nearest_neighbor_plan(&tokyo_origin(), &tokyo_destinations());
        plan.ordered_stops.reverse();

        let collection = create_route_geojson(&plan);

        assert_eq!(collection.features[0].property("sequence"), Some(&0.into()));
        assert_eq!(collection.features[0].property("label"), Some(&"Tokyo Station".into()));
        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["features"][4]["geometry"]["type"], "LineString");
        assert_eq!(json["features"][4]["properties"]["totalDistanceM"], plan.total_distance_m);
    }
}
