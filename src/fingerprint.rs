//! Cache keys for distance lookups.
//!
//! Coordinates are cut to 6 decimals and departure times floored to 5-minute
//! buckets, so requests that differ only by float noise or a few minutes share
//! a key.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::entities::{Coordinates, DistanceRequest, TrafficModel, UnitSystem};
use crate::planning::to_fixed;

pub const TIME_BUCKET_SECONDS: i64 = 5 * 60;

/// Start of the 5-minute window containing `ts`.
pub fn bucket_departure_time(ts: DateTime<Utc>) -> DateTime<Utc> {
    let bucket = ts.timestamp().div_euclid(TIME_BUCKET_SECONDS) * TIME_BUCKET_SECONDS;
    Utc.timestamp_opt(bucket, 0).single().unwrap_or(ts)
}

fn normalize_coordinate(value: f64) -> String {
    let formatted = to_fixed(value, 6);
    // "-0.000000" and "0.000000" are the same place.
    if formatted.trim_start_matches('-').bytes().all(|b| b == b'0' || b == b'.') {
        formatted.trim_start_matches('-').to_string()
    } else {
        formatted
    }
}

fn normalize_point(point: &Coordinates) -> String {
    format!(
        "{},{}",
        normalize_coordinate(point.lat),
        normalize_coordinate(point.lng)
    )
}

fn hex_sha256(payload: &[u8]) -> String {
    format!("{:x}", Sha256::digest(payload))
}

/// Bucket a request falls into. Requests without a departure time use now.
pub fn request_time_bucket(request: &DistanceRequest) -> DateTime<Utc> {
    bucket_departure_time(request.departure_time.unwrap_or_else(Utc::now))
}

/// 64 hex chars identifying a normalized distance request.
pub fn make_distance_cache_key(request: &DistanceRequest) -> String {
    let bucket = request_time_bucket(request);

    let payload = [
        normalize_point(&request.origin),
        normalize_point(&request.destination),
        request.mode().as_str().to_string(),
        bucket.to_rfc3339_opts(SecondsFormat::Millis, true),
        request.traffic_model().as_str().to_string(),
        request.unit_system().as_str().to_string(),
    ]
    .join("|");

    hex_sha256(payload.as_bytes())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FingerprintOptions {
    traffic_model: TrafficModel,
    unit_system: UnitSystem,
}

/// Hash of the provider options alone, independent of where and when.
pub fn make_request_fingerprint(request: &DistanceRequest) -> String {
    let options = FingerprintOptions {
        traffic_model: request.traffic_model(),
        unit_system: request.unit_system(),
    };
    let payload = serde_json::to_string(&options).unwrap_or_default();

    hex_sha256(payload.as_bytes())
}
