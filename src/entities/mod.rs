mod coordinates;
mod diagnostics;
mod distance;
mod features;
mod optimization;
mod options;
mod plan;
mod route_record;

pub use coordinates::{Coordinates, Stop};
pub use diagnostics::{Diagnostics, FallbackReason, FallbackStrategy, OptimizationDiagnostics};
pub use distance::{
    CacheStatus, DistanceCacheEntry, DistanceMetrics, DistanceOptions, DistanceRequest,
    DistanceResponse, DistanceSource, Freshness, TrafficModel, TravelMode, UnitSystem,
};
pub use features::{line_strings, Feature, FeatureCollection, Geometry, JsonObject, Position};
pub use optimization::{
    OptimizationResult, OptimizedPlan, OptimizedRoute, RouteOptimizeInput, MAX_DESTINATIONS,
};
pub use options::{OptimizerOptions, RouteOptimizationOptions, Strategy};
pub use plan::{OrderedStop, RoutePlan};
pub use route_record::{RouteAlgorithm, RoutePage, RouteRecord, RouteSummary};
