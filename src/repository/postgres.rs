use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, Executor, Pool, Postgres, Row};
use uuid::Uuid;

use super::{clamp_limit, paginate, RouteRepository};
use crate::{
    entities::{RoutePage, RouteRecord},
    error::Error,
};

/// Route history in the `routes` table (KV store keyed by route id).
#[derive(Clone)]
pub struct PgRouteRepository {
    pool: Pool<Postgres>,
}

impl PgRouteRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RouteRepository for PgRouteRepository {
    #[tracing::instrument(skip(self, record), fields(route_id = %record.route_id))]
    async fn save_route_result(&self, record: RouteRecord) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;
        conn.execute(
            sqlx::query(
                "INSERT INTO routes (id, user_id, created_at, data) VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data",
            )
            .bind(&record.route_id)
            .bind(&record.user_id)
            .bind(&record.created_at)
            .bind(Json(&record)),
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn list_routes(
        &self,
        user_id: &str,
        limit: Option<i64>,
        cursor: Option<DateTime<Utc>>,
    ) -> Result<RoutePage, Error> {
        let limit = clamp_limit(limit);
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query(
                    "SELECT data FROM routes WHERE user_id = $1 AND ($2::timestamptz IS NULL OR created_at < $2) \
                     ORDER BY created_at DESC LIMIT $3",
                )
                .bind(user_id)
                .bind(cursor)
                .bind(limit as i64 + 1),
            )
            .await?;

        let records = rows
            .iter()
            .map(|row| row.try_get::<Json<RouteRecord>, _>("data").map(|Json(r)| r))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(paginate(records, limit))
    }

    #[tracing::instrument(skip(self))]
    async fn get_route(
        &self,
        user_id: &str,
        route_id: Uuid,
    ) -> Result<Option<RouteRecord>, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(
                sqlx::query("SELECT data FROM routes WHERE id = $1 AND user_id = $2")
                    .bind(&route_id)
                    .bind(user_id),
            )
            .await?;

        match maybe_result {
            Some(row) => {
                let Json(record): Json<RouteRecord> = row.try_get("data")?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}
