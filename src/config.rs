//! Runtime settings read from the environment (and `.env`, if present).

use std::{collections::HashMap, env, net::SocketAddr, time::Duration};

use crate::{
    error::{config_error, Error},
    external::{google_maps::DEFAULT_API_BASE, optimizer::DEFAULT_RETRY_DELAYS_MS},
};

const DEFAULT_OPTIMIZER_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub optimizer_url: String,
    pub optimizer_timeout: Duration,
    pub optimizer_retry_delays: Vec<Duration>,
    pub google_maps_api_key: Option<String>,
    pub google_maps_api_base: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub listen_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        Self::from_vars(&env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, Error> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let optimizer_url = get("OPTIMIZER_SERVICE_URL")
            .ok_or_else(|| config_error("OPTIMIZER_SERVICE_URL"))?
            .to_string();

        let optimizer_timeout = match get("OPTIMIZER_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(
                raw.parse()
                    .map_err(|_| config_error("OPTIMIZER_TIMEOUT_MS"))?,
            ),
            None => Duration::from_millis(DEFAULT_OPTIMIZER_TIMEOUT_MS),
        };

        let optimizer_retry_delays = match get("OPTIMIZER_RETRY_DELAYS_MS") {
            Some(raw) => parse_delays(raw)?,
            None => DEFAULT_RETRY_DELAYS_MS
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
        };

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .map_err(|_| config_error("DATABASE_MAX_CONNECTIONS"))?,
            None => DEFAULT_DATABASE_MAX_CONNECTIONS,
        };

        let listen_addr = get("LISTEN_ADDR")
            .unwrap_or(DEFAULT_LISTEN_ADDR)
            .parse()
            .map_err(|_| config_error("LISTEN_ADDR"))?;

        Ok(Self {
            optimizer_url,
            optimizer_timeout,
            optimizer_retry_delays,
            google_maps_api_key: get("GOOGLE_MAPS_API_KEY").map(String::from),
            google_maps_api_base: get("GOOGLE_MAPS_API_BASE")
                .unwrap_or(DEFAULT_API_BASE)
                .to_string(),
            database_url: get("DATABASE_URL").map(String::from),
            database_max_connections,
            listen_addr,
        })
    }
}

/// `"1000, 2000,4000"` -> delays. An empty list disables retries.
fn parse_delays(raw: &str) -> Result<Vec<Duration>, Error> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| config_error("OPTIMIZER_RETRY_DELAYS_MS"))
        })
        .collect()
}
