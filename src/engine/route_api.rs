use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{optimize_with_fallback, Engine};
use crate::{
    api::RouteAPI,
    entities::{OptimizedRoute, RouteOptimizeInput, RoutePage, RouteRecord},
    error::{not_found_error, Error},
    planning::compute_route_params_digest,
};

#[async_trait]
impl RouteAPI for Engine {
    #[tracing::instrument(name = "Engine::optimize_route", skip(self, input))]
    async fn optimize_route(
        &self,
        user_id: Option<String>,
        input: RouteOptimizeInput,
    ) -> Result<OptimizedRoute, Error> {
        let result = optimize_with_fallback(self.optimizer.as_ref(), &input).await?;
        let params_digest =
            compute_route_params_digest(&input.origin, &input.destinations, input.options.as_ref());

        tracing::info!(
            route_id = %result.plan.route_id,
            fallback_used = result.diagnostics.fallback_used,
            %params_digest,
            "route optimized"
        );

        if let Some(user_id) = user_id {
            let record = RouteRecord::new(
                user_id,
                input.origin,
                input.options,
                params_digest.clone(),
                &result,
                self.distances.get_metrics(),
            );
            // history is a side record, the caller still gets the plan
            if let Err(err) = self.routes.save_route_result(record).await {
                tracing::error!(?err, "failed to save route history");
            }
        }

        Ok(OptimizedRoute {
            result,
            params_digest,
        })
    }

    #[tracing::instrument(name = "Engine::find_route", skip(self))]
    async fn find_route(&self, user_id: String, route_id: Uuid) -> Result<RouteRecord, Error> {
        self.routes
            .get_route(&user_id, route_id)
            .await?
            .ok_or_else(not_found_error)
    }

    #[tracing::instrument(name = "Engine::list_routes", skip(self))]
    async fn list_routes(
        &self,
        user_id: String,
        limit: Option<i64>,
        cursor: Option<DateTime<Utc>>,
    ) -> Result<RoutePage, Error> {
        self.routes.list_routes(&user_id, limit, cursor).await
    }
}
