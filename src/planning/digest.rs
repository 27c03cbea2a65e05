//! Stable digest over the parameters of an optimization request.
//!
//! Used to spot repeated requests in the route history. Not a cache key.

use serde_json::{json, Map, Number, Value};

use crate::entities::{RouteOptimizationOptions, Stop};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub fn fnv1a64(input: &[u8]) -> u64 {
    input.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Fixed-point rendering that breaks exact ties away from zero, so
/// `0.0078125` at 6 decimals is `0.007813`. Plain `{:.N}` formatting would
/// round such ties to even.
pub fn to_fixed(value: f64, decimals: i32) -> String {
    let precision = decimals.max(0) as usize;
    // A binary float sits exactly halfway between two N-decimal values only
    // when value * 2^(N+1) is an odd integer.
    let scaled = value * 2f64.powi(decimals + 1);
    let is_tie = value.is_finite() && scaled.fract() == 0.0 && scaled % 2.0 != 0.0;

    if is_tie {
        let nudge = value.signum() * 10f64.powi(-(decimals + 3));
        format!("{:.*}", precision, value + nudge)
    } else {
        format!("{:.*}", precision, value)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    to_fixed(value, decimals).parse().unwrap_or(value)
}

/// Whole numbers are written without a fractional part so `35` and `35.0`
/// digest the same.
fn number(value: f64) -> Value {
    let value = if value == 0.0 { 0.0 } else { value };
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

fn normalize_stop(stop: &Stop) -> Value {
    json!({
        "id": stop.id,
        "label": stop.label,
        "lat": number(round_to(stop.lat, 6)),
        "lng": number(round_to(stop.lng, 6)),
    })
}

fn normalize_options(options: Option<&RouteOptimizationOptions>) -> Value {
    let mut normalized = Map::new();
    let Some(options) = options else {
        return Value::Object(normalized);
    };

    if let Some(strategy) = options.strategy {
        normalized.insert("strategy".into(), json!(strategy));
    }
    if let Some(iterations) = options.max_iterations {
        normalized.insert("maxIterations".into(), number(iterations.round()));
    }
    if let Some(runtime) = options.max_runtime_seconds {
        normalized.insert("maxRuntimeSeconds".into(), number(runtime.round()));
    }
    if let Some(tolerance) = options.fallback_tolerance {
        normalized.insert("fallbackTolerance".into(), number(round_to(tolerance, 3)));
    }

    Value::Object(normalized)
}

/// Serializes with object keys sorted at every level, whatever map ordering
/// serde_json was built with.
fn canonical_json(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let items: Vec<_> = items.iter().map(canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let entries: Vec<_> = entries
                .into_iter()
                .map(|(key, val)| format!("{}:{}", Value::from(key.as_str()), canonical_json(val)))
                .collect();
            format!("{{{}}}", entries.join(","))
        }
        scalar => scalar.to_string(),
    }
}

/// 16 lowercase hex chars. Insensitive to coordinate noise below 6 decimals
/// and tolerance noise below 3 decimals; sensitive to destination order.
pub fn compute_route_params_digest(
    origin: &Stop,
    destinations: &[Stop],
    options: Option<&RouteOptimizationOptions>,
) -> String {
    let normalized = json!({
        "origin": normalize_stop(origin),
        "destinations": destinations.iter().map(normalize_stop).collect::<Vec<_>>(),
        "options": normalize_options(options),
    });

    let canonical = canonical_json(&normalized);
    format!("{:016x}", fnv1a64(canonical.as_bytes()))
}
