use sqlx::{postgres::PgPoolOptions, Executor, Pool, Postgres};

pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    #[tracing::instrument(name = "PgStore::new", skip(db_uri))]
    pub async fn new(db_uri: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_uri)
            .await?;

        // TODO: move this to migrations
        pool.execute(
            "CREATE TABLE IF NOT EXISTS distance_cache (\
             key VARCHAR PRIMARY KEY, \
             origin_lat DOUBLE PRECISION NOT NULL, origin_lng DOUBLE PRECISION NOT NULL, \
             destination_lat DOUBLE PRECISION NOT NULL, destination_lng DOUBLE PRECISION NOT NULL, \
             mode VARCHAR NOT NULL, time_bucket TIMESTAMPTZ NOT NULL, \
             distance_m INT8 NOT NULL, duration_s INT8 NOT NULL, \
             provider VARCHAR NOT NULL, status VARCHAR NOT NULL, \
             requested_at TIMESTAMPTZ NOT NULL, expires_at TIMESTAMPTZ NOT NULL, \
             request_fingerprint VARCHAR NOT NULL, metadata JSONB, \
             hit_count INT8 NOT NULL DEFAULT 0, last_hit_at TIMESTAMPTZ, \
             created_at TIMESTAMPTZ NOT NULL DEFAULT now(), updated_at TIMESTAMPTZ NOT NULL DEFAULT now())",
        )
        .await?;

        // route history (KV store keyed by route id)
        pool.execute(
            "CREATE TABLE IF NOT EXISTS routes (\
             id UUID PRIMARY KEY, user_id VARCHAR NOT NULL, \
             created_at TIMESTAMPTZ NOT NULL, data JSONB NOT NULL)",
        )
        .await?;
        pool.execute(
            "CREATE INDEX IF NOT EXISTS routes_user_created_idx ON routes (user_id, created_at DESC)",
        )
        .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> Pool<Postgres> {
        self.pool.clone()
    }
}
