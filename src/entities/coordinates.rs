use serde::{Deserialize, Serialize};

use crate::validation::{field, Issues, Validate};

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// GeoJSON position order.
    pub fn lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl Validate for Coordinates {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        issues.check_range(self.lat, MIN_LATITUDE, MAX_LATITUDE, &field(path, "lat"));
        issues.check_range(self.lng, MIN_LONGITUDE, MAX_LONGITUDE, &field(path, "lng"));
    }
}

impl From<Coordinates> for String {
    fn from(c: Coordinates) -> String {
        format!("{},{}", c.lat, c.lng)
    }
}

/// One location to visit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

impl Stop {
    pub fn new(id: impl Into<String>, label: Option<&str>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            label: label.map(Into::into),
            lat,
            lng,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

impl Validate for Stop {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        issues.check_non_empty(&self.id, &field(path, "id"));
        if let Some(label) = &self.label {
            issues.check_non_empty(label, &field(path, "label"));
        }
        self.coordinates().collect_issues(path, issues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_out_of_range_are_rejected() {
        let err = Coordinates::new(90.5, -180.5).validate().unwrap_err();

        let paths: Vec<_> = err.issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["lat", "lng"]);
    }

    #[test]
    fn boundary_coordinates_are_accepted() {
        assert!(Coordinates::new(-90.0, 180.0).validate().is_ok());
    }

    #[test]
    fn stop_requires_id_and_non_empty_label() {
        let stop = Stop::new("", Some(""), 35.0, 139.0);

        let err = stop.validate().unwrap_err();
        let paths: Vec<_> = err.issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["id", "label"]);
    }

    #[test]
    fn stop_without_label_serializes_without_it() {
        let json = serde_json::to_value(Stop::new("a", None, 1.0, 2.0)).unwrap();

        assert_eq!(json, serde_json::json!({ "id": "a", "lat": 1.0, "lng": 2.0 }));
    }
}
