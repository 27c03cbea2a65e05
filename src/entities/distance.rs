use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;
use crate::validation::{field, Issues, Validate};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Transit => "transit",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficModel {
    #[default]
    BestGuess,
    Optimistic,
    Pessimistic,
}

impl TrafficModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BestGuess => "best_guess",
            Self::Optimistic => "optimistic",
            Self::Pessimistic => "pessimistic",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_model: Option<TrafficModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_system: Option<UnitSystem>,
}

/// A single origin → destination lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceRequest {
    pub origin: Coordinates,
    pub destination: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<TravelMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<DistanceOptions>,
}

impl DistanceRequest {
    pub fn new(origin: Coordinates, destination: Coordinates) -> Self {
        Self {
            origin,
            destination,
            mode: None,
            departure_time: None,
            options: None,
        }
    }

    pub fn mode(&self) -> TravelMode {
        self.mode.unwrap_or_default()
    }

    pub fn traffic_model(&self) -> TrafficModel {
        self.options
            .as_ref()
            .and_then(|o| o.traffic_model)
            .unwrap_or_default()
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.options
            .as_ref()
            .and_then(|o| o.unit_system)
            .unwrap_or_default()
    }
}

impl Validate for DistanceRequest {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        self.origin.collect_issues(&field(path, "origin"), issues);
        self.destination
            .collect_issues(&field(path, "destination"), issues);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Fresh,
    Expired,
    /// Just fetched from the provider.
    Fetched,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSource {
    Cache,
    Api,
}

/// Status stored alongside a cached row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    Fresh,
    Expired,
    Error,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Expired => "expired",
            Self::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fresh" => Some(Self::Fresh),
            "expired" => Some(Self::Expired),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceResponse {
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub freshness: Freshness,
    pub provider: String,
    pub requested_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub source: DistanceSource,
}

/// What the cache keeps per key. Overwritten whole on every write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceCacheEntry {
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub provider: String,
    pub requested_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: CacheStatus,
}

impl DistanceCacheEntry {
    pub fn from_response(response: &DistanceResponse) -> Self {
        Self {
            distance_meters: response.distance_meters,
            duration_seconds: response.duration_seconds,
            provider: response.provider.clone(),
            requested_at: response.requested_at,
            expires_at: response.expires_at,
            status: CacheStatus::Fresh,
        }
    }

    /// An entry flagged `error` is always reported expired.
    pub fn freshness_at(&self, now: DateTime<Utc>) -> Freshness {
        if self.status == CacheStatus::Error || self.expires_at <= now {
            Freshness::Expired
        } else {
            Freshness::Fresh
        }
    }

    pub fn to_response(&self, now: DateTime<Utc>) -> DistanceResponse {
        DistanceResponse {
            distance_meters: self.distance_meters,
            duration_seconds: self.duration_seconds,
            freshness: self.freshness_at(now),
            provider: self.provider.clone(),
            requested_at: self.requested_at,
            expires_at: self.expires_at,
            source: DistanceSource::Cache,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceMetrics {
    pub hits: u64,
    pub misses: u64,
}
