//! Route history: saved optimizations per user.

mod memory;
mod postgres;

pub use memory::InMemoryRouteRepository;
pub use postgres::PgRouteRepository;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    entities::{RoutePage, RouteRecord},
    error::Error,
};

pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const MAX_PAGE_LIMIT: usize = 50;

pub fn clamp_limit(limit: Option<i64>) -> usize {
    match limit {
        Some(limit) => limit.clamp(1, MAX_PAGE_LIMIT as i64) as usize,
        None => DEFAULT_PAGE_LIMIT,
    }
}

#[async_trait]
pub trait RouteRepository {
    async fn save_route_result(&self, record: RouteRecord) -> Result<(), Error>;

    /// Newest first. `cursor` is the `createdAt` of the last route already
    /// seen; only older routes are returned.
    async fn list_routes(
        &self,
        user_id: &str,
        limit: Option<i64>,
        cursor: Option<DateTime<Utc>>,
    ) -> Result<RoutePage, Error>;

    async fn get_route(&self, user_id: &str, route_id: Uuid)
        -> Result<Option<RouteRecord>, Error>;
}

pub type DynRouteRepository = Arc<dyn RouteRepository + Send + Sync>;

/// Cuts one page out of records already sorted newest first and filtered by
/// cursor. `records` may hold one more than `limit` to signal a next page.
pub(crate) fn paginate(mut records: Vec<RouteRecord>, limit: usize) -> RoutePage {
    let has_more = records.len() > limit;
    records.truncate(limit);

    let next_cursor = if has_more {
        records.last().map(|record| record.created_at)
    } else {
        None
    };

    RoutePage {
        routes: records.iter().map(RouteRecord::summary).collect(),
        next_cursor,
    }
}
