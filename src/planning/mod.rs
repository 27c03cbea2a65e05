//! Pure geometry and tour helpers. No I/O.

mod digest;
mod haversine;
mod nearest_neighbor;
mod route_geojson;

pub use digest::{compute_route_params_digest, to_fixed};
pub use haversine::{estimate_duration, haversine_distance, AVERAGE_CITY_SPEED_MPS, EARTH_RADIUS_M};
pub use nearest_neighbor::compute_nearest_neighbor_plan;
pub use route_geojson::create_route_geojson;

pub(crate) use nearest_neighbor::round_metric;
