//! Great-circle distance and a flat-speed duration estimate.

use crate::entities::Coordinates;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Roughly 50 km/h, an average city driving speed.
pub const AVERAGE_CITY_SPEED_MPS: f64 = 13.8889;

/// Distance in meters between two coordinates.
pub fn haversine_distance(a: &Coordinates, b: &Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Seconds needed to drive `distance_meters` at the average city speed.
pub fn estimate_duration(distance_meters: f64) -> f64 {
    if distance_meters <= 0.0 {
        return 0.0;
    }

    distance_meters / AVERAGE_CITY_SPEED_MPS
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKYO_STATION: Coordinates = Coordinates {
        lat: 35.681236,
        lng: 139.767125,
    };
    const TOKYO_TOWER: Coordinates = Coordinates {
        lat: 35.65858,
        lng: 139.745433,
    };

    #[test]
    fn identical_points_are_zero_apart() {
        assert_eq!(haversine_distance(&TOKYO_STATION, &TOKYO_STATION), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_distance(&TOKYO_STATION, &TOKYO_TOWER);
        let back = haversine_distance(&TOKYO_TOWER, &TOKYO_STATION);

        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn known_distance_is_close() {
        // Tokyo Station to Tokyo Tower is a little over 3 km as the crow flies.
        let d = haversine_distance(&TOKYO_STATION, &TOKYO_TOWER);

        assert!(d > 3_000.0 && d < 3_400.0, "got {}", d);
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_distance(&Coordinates::new(0.0, 0.0), &Coordinates::new(1.0, 0.0));

        assert!((d - 111_194.9).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn duration_uses_city_speed() {
        assert_eq!(estimate_duration(0.0), 0.0);
        assert_eq!(estimate_duration(-5.0), 0.0);
        assert!((estimate_duration(13_888.9) - 1_000.0).abs() < 1e-6);
    }
}
