use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{postgres::PgRow, types::Json, Executor, Pool, Postgres, Row};

use super::DistanceCache;
use crate::{
    entities::{CacheStatus, DistanceCacheEntry, DistanceRequest, DistanceResponse},
    error::Error,
    fingerprint::{make_distance_cache_key, make_request_fingerprint, request_time_bucket},
};

/// Cache rows in the `distance_cache` table. See `db::PgStore` for the schema.
#[derive(Clone)]
pub struct PgDistanceCache {
    pool: Pool<Postgres>,
}

impl PgDistanceCache {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Bumps the hit counter in the background. The read never waits on it.
    fn record_hit(&self, key: String) {
        let pool = self.pool.clone();

        tokio::spawn(async move {
            let result = pool
                .execute(
                    sqlx::query(
                        "UPDATE distance_cache SET hit_count = hit_count + 1, last_hit_at = now() WHERE key = $1",
                    )
                    .bind(&key),
                )
                .await;

            if let Err(err) = result {
                tracing::warn!(?err, key = %key, "failed to increment distance cache hit count");
            }
        });
    }
}

fn entry_from_row(row: &PgRow) -> Result<DistanceCacheEntry, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let distance_m: i64 = row.try_get("distance_m")?;
    let duration_s: i64 = row.try_get("duration_s")?;
    let requested_at: DateTime<Utc> = row.try_get("requested_at")?;
    let expires_at: DateTime<Utc> = row.try_get("expires_at")?;

    Ok(DistanceCacheEntry {
        distance_meters: distance_m.max(0) as u64,
        duration_seconds: duration_s.max(0) as u64,
        provider: row.try_get("provider")?,
        requested_at,
        expires_at,
        // unknown statuses are not trusted
        status: CacheStatus::parse(&status).unwrap_or(CacheStatus::Error),
    })
}

#[async_trait]
impl DistanceCache for PgDistanceCache {
    #[tracing::instrument(skip(self))]
    async fn get_distance(
        &self,
        request: &DistanceRequest,
    ) -> Result<Option<DistanceResponse>, Error> {
        let key = make_distance_cache_key(request);
        let mut conn = self.pool.acquire().await?;

        let maybe_row = conn
            .fetch_optional(
                sqlx::query(
                    "SELECT distance_m, duration_s, provider, status, requested_at, expires_at FROM distance_cache WHERE key = $1",
                )
                .bind(&key),
            )
            .await?;

        let row = match maybe_row {
            Some(row) => row,
            None => return Ok(None),
        };
        let entry = entry_from_row(&row)?;

        self.record_hit(key);

        Ok(Some(entry.to_response(Utc::now())))
    }

    #[tracing::instrument(skip(self, response))]
    async fn put_distance(
        &self,
        request: &DistanceRequest,
        response: &DistanceResponse,
    ) -> Result<(), Error> {
        let key = make_distance_cache_key(request);
        let fingerprint = make_request_fingerprint(request);
        let time_bucket = request_time_bucket(request);
        let entry = DistanceCacheEntry::from_response(response);
        let metadata = json!({
            "source": response.source,
            "originalRequestedAt": response.requested_at,
        });

        let mut conn = self.pool.acquire().await?;
        conn.execute(
            sqlx::query(
                "INSERT INTO distance_cache (key, origin_lat, origin_lng, destination_lat, destination_lng, mode, time_bucket, distance_m, duration_s, provider, status, requested_at, expires_at, request_fingerprint, metadata) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
                 ON CONFLICT (key) DO UPDATE SET \
                 distance_m = EXCLUDED.distance_m, duration_s = EXCLUDED.duration_s, provider = EXCLUDED.provider, \
                 status = EXCLUDED.status, requested_at = EXCLUDED.requested_at, expires_at = EXCLUDED.expires_at, \
                 request_fingerprint = EXCLUDED.request_fingerprint, metadata = EXCLUDED.metadata, updated_at = now()",
            )
            .bind(&key)
            .bind(request.origin.lat)
            .bind(request.origin.lng)
            .bind(request.destination.lat)
            .bind(request.destination.lng)
            .bind(request.mode().as_str())
            .bind(time_bucket)
            .bind(entry.distance_meters as i64)
            .bind(entry.duration_seconds as i64)
            .bind(&entry.provider)
            .bind(entry.status.as_str())
            .bind(entry.requested_at)
            .bind(entry.expires_at)
            .bind(&fingerprint)
            .bind(Json(&metadata)),
        )
        .await?;

        Ok(())
    }
}
