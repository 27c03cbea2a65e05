//! Route output as GeoJSON, built on the `geojson` crate types.

pub use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Position};

use crate::validation::{field, index, Issues, Validate};

/// Positions of every LineString in the collection.
pub fn line_strings(collection: &FeatureCollection) -> impl Iterator<Item = &Vec<Position>> {
    collection
        .features
        .iter()
        .filter_map(|feature| match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::LineString(positions)) => Some(positions),
            _ => None,
        })
}

impl Validate for FeatureCollection {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        let features_path = field(path, "features");

        for (idx, feature) in self.features.iter().enumerate() {
            let feature_path = index(&features_path, idx);
            let has_properties = feature.properties.is_some();

            match feature.geometry.as_ref().map(|g| &g.value) {
                Some(geojson::Value::Point(position)) => {
                    issues.check(
                        position.len() == 2,
                        &feature_path,
                        "a Point needs a [lng, lat] position",
                    );
                    issues.check(
                        feature.property("sequence").is_some(),
                        &field(&feature_path, "properties"),
                        "a stop needs a sequence",
                    );
                }
                Some(geojson::Value::LineString(positions)) => {
                    issues.check(
                        positions.len() >= 2,
                        &feature_path,
                        "a LineString needs at least two positions",
                    );
                    issues.check(
                        has_properties,
                        &field(&feature_path, "properties"),
                        "a route line needs its totals",
                    );
                }
                Some(_) => issues.push(&feature_path, "only Point and LineString are used"),
                None => issues.push(&feature_path, "geometry is missing"),
            }
        }

        issues.check(
            line_strings(self).count() == 1,
            &features_path,
            "must contain exactly one LineString",
        );
    }
}
