use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{clamp_limit, paginate, RouteRepository};
use crate::{
    entities::{RoutePage, RouteRecord},
    error::Error,
};

#[derive(Default)]
pub struct InMemoryRouteRepository {
    routes: RwLock<HashMap<String, HashMap<Uuid, RouteRecord>>>,
}

impl InMemoryRouteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RouteRepository for InMemoryRouteRepository {
    async fn save_route_result(&self, record: RouteRecord) -> Result<(), Error> {
        let mut routes = self.routes.write().await;
        routes
            .entry(record.user_id.clone())
            .or_default()
            .insert(record.route_id, record);

        Ok(())
    }

    async fn list_routes(
        &self,
        user_id: &str,
        limit: Option<i64>,
        cursor: Option<DateTime<Utc>>,
    ) -> Result<RoutePage, Error> {
        let limit = clamp_limit(limit);
        let routes = self.routes.read().await;

        let mut records: Vec<RouteRecord> = routes
            .get(user_id)
            .map(|per_user| {
                per_user
                    .values()
                    .filter(|r| cursor.map_or(true, |c| r.created_at < c))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(paginate(records, limit))
    }

    async fn get_route(
        &self,
        user_id: &str,
        route_id: Uuid,
    ) -> Result<Option<RouteRecord>, Error> {
        let routes = self.routes.read().await;

        Ok(routes
            .get(user_id)
            .and_then(|per_user| per_user.get(&route_id))
            .cloned())
    }
}
