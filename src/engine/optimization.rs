//! Fallback policy around the remote optimizer.
//!
//! The optimizer's answer is used only when it is healthy. Anything else
//! (an error, a self-reported fallback, a gap above tolerance) is replaced
//! by a local nearest-neighbor tour, so a caller with valid input always
//! gets a plan back.

use uuid::Uuid;

use crate::{
    entities::{
        Diagnostics, FallbackReason, OptimizationDiagnostics, OptimizationResult, OptimizedPlan,
        RouteOptimizeInput,
    },
    error::{invalid_result_error, Error},
    external::optimizer::{OptimizerClient, OptimizerRequest},
    planning::{compute_nearest_neighbor_plan, create_route_geojson},
    validation::Validate,
};

/// Why a successful optimizer response should still be discarded, if at all.
pub fn fallback_reason(diagnostics: &Diagnostics, tolerance: f64) -> Option<FallbackReason> {
    if diagnostics.fallback_used {
        Some(FallbackReason::OptimizerFallbackSignaled)
    } else if diagnostics.gap > tolerance {
        Some(FallbackReason::OptimizerGapExceeded)
    } else {
        None
    }
}

fn local_plan(input: &RouteOptimizeInput) -> OptimizedPlan {
    OptimizedPlan {
        route_id: Uuid::new_v4(),
        plan: compute_nearest_neighbor_plan(&input.origin, &input.destinations),
    }
}

/// Validates `input`, asks the optimizer, and falls back locally when the
/// answer can't be used. Only invalid input or a result that fails its own
/// validation is returned as an error.
#[tracing::instrument(skip_all, fields(destinations = input.destinations.len()))]
pub async fn optimize_with_fallback(
    client: &(dyn OptimizerClient + Send + Sync),
    input: &RouteOptimizeInput,
) -> Result<OptimizationResult, Error> {
    input.validate()?;

    let options = input
        .options
        .as_ref()
        .map(|options| options.resolve())
        .unwrap_or_default();
    let request = OptimizerRequest::new(
        input.origin.coordinates(),
        input.destinations.clone(),
        options,
    );

    let (plan, diagnostics) = match client.optimize(&request).await {
        Ok(response) => match fallback_reason(&response.diagnostics, options.fallback_tolerance) {
            None => (
                OptimizedPlan {
                    route_id: response.route_id,
                    plan: response.plan,
                },
                OptimizationDiagnostics::from_optimizer(response.diagnostics),
            ),
            Some(reason) => {
                tracing::info!(
                    ?reason,
                    gap = response.diagnostics.gap,
                    tolerance = options.fallback_tolerance,
                    "discarding optimizer result, using nearest neighbor"
                );
                (
                    local_plan(input),
                    OptimizationDiagnostics::fallback(reason, Some(response.diagnostics), None),
                )
            }
        },
        Err(err) => {
            tracing::warn!(%err, "optimizer failed, using nearest neighbor");
            (
                local_plan(input),
                OptimizationDiagnostics::fallback(
                    FallbackReason::OptimizerError,
                    None,
                    Some(err.code),
                ),
            )
        }
    };

    let result = OptimizationResult {
        geo_json: create_route_geojson(&plan.plan),
        plan,
        diagnostics,
    };
    result.validate().map_err(invalid_result_error)?;

    Ok(result)
}
