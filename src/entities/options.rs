use serde::{Deserialize, Serialize};

use crate::validation::{field, Issues, Validate};

pub const DEFAULT_MAX_ITERATIONS: u32 = 4_000;
pub const DEFAULT_MAX_RUNTIME_SECONDS: u32 = 30;
pub const DEFAULT_FALLBACK_TOLERANCE: f64 = 0.15;

const MIN_ITERATIONS: u32 = 10;
const MAX_ITERATIONS: u32 = 10_000;
const MIN_RUNTIME_SECONDS: u32 = 1;
const MAX_RUNTIME_SECONDS: u32 = 60;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Fast,
    #[default]
    Quality,
}

/// Fully resolved solver options, as sent to the optimizer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerOptions {
    pub strategy: Strategy,
    pub max_iterations: u32,
    pub max_runtime_seconds: u32,
    pub fallback_tolerance: f64,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Quality,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_runtime_seconds: DEFAULT_MAX_RUNTIME_SECONDS,
            fallback_tolerance: DEFAULT_FALLBACK_TOLERANCE,
        }
    }
}

impl Validate for OptimizerOptions {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        issues.check(
            (MIN_ITERATIONS..=MAX_ITERATIONS).contains(&self.max_iterations),
            &field(path, "maxIterations"),
            format!("must be between {} and {}", MIN_ITERATIONS, MAX_ITERATIONS),
        );
        issues.check(
            (MIN_RUNTIME_SECONDS..=MAX_RUNTIME_SECONDS).contains(&self.max_runtime_seconds),
            &field(path, "maxRuntimeSeconds"),
            format!(
                "must be between {} and {}",
                MIN_RUNTIME_SECONDS, MAX_RUNTIME_SECONDS
            ),
        );
        issues.check_range(
            self.fallback_tolerance,
            0.0,
            1.0,
            &field(path, "fallbackTolerance"),
        );
    }
}

/// Options as a caller supplies them: every field optional, numbers untyped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOptimizationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_runtime_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_tolerance: Option<f64>,
}

impl RouteOptimizationOptions {
    /// Fills defaults. Call after [`Validate::validate`] has passed.
    pub fn resolve(&self) -> OptimizerOptions {
        let defaults = OptimizerOptions::default();

        OptimizerOptions {
            strategy: self.strategy.unwrap_or(defaults.strategy),
            max_iterations: self
                .max_iterations
                .map_or(defaults.max_iterations, |v| v as u32),
            max_runtime_seconds: self
                .max_runtime_seconds
                .map_or(defaults.max_runtime_seconds, |v| v as u32),
            fallback_tolerance: self
                .fallback_tolerance
                .unwrap_or(defaults.fallback_tolerance),
        }
    }
}

fn check_integer_range(issues: &mut Issues, value: f64, min: u32, max: u32, path: &str) {
    if value.fract() != 0.0 {
        issues.push(path, "must be an integer");
    } else {
        issues.check_range(value, f64::from(min), f64::from(max), path);
    }
}

impl Validate for RouteOptimizationOptions {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        if let Some(v) = self.max_iterations {
            check_integer_range(
                issues,
                v,
                MIN_ITERATIONS,
                MAX_ITERATIONS,
                &field(path, "maxIterations"),
            );
        }
        if let Some(v) = self.max_runtime_seconds {
            check_integer_range(
                issues,
                v,
                MIN_RUNTIME_SECONDS,
                MAX_RUNTIME_SECONDS,
                &field(path, "maxRuntimeSeconds"),
            );
        }
        if let Some(v) = self.fallback_tolerance {
            issues.check_range(v, 0.0, 1.0, &field(path, "fallbackTolerance"));
        }
    }
}
