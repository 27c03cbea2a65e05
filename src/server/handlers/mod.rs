pub mod distances;
pub mod geocode;
pub mod routes;
