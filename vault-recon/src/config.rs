use chrono::Duration;
use std::net::SocketAddr;
use vault_recon_worker::WorkerConfig;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Process configuration, sourced from the environment (§6: "No CLI is part
/// of the core; environment-variable names are left to the implementer").
/// `.env` is loaded first by `main` via `dotenvy`, so these are just
/// `std::env::var` reads with defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_db_connections: u32,
    pub bind_addr: SocketAddr,
    pub worker_enabled: bool,
    pub blockbook_base_url: String,
    pub worker: WorkerConfig,
    pub worker_stop_timeout: std::time::Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr: SocketAddr = env_or("VAULT_RECON_BIND_ADDR", "0.0.0.0:8080").parse()?;

        let worker = WorkerConfig {
            polling_interval_ms: env_parsed("RECONCILIATION_POLLING_INTERVAL_MS", 5_000),
            max_concurrent_jobs: env_parsed("RECONCILIATION_MAX_CONCURRENT_JOBS", 4),
            stale_sweep_interval: Duration::minutes(5),
            stale_job_age: Duration::hours(1),
            async_jobs_enabled: env_parsed("APIS_BLOCKBOOK_ASYNC_JOBS_ENABLED", false),
            async_job_timeout: Duration::hours(env_parsed(
                "APIS_BLOCKBOOK_ASYNC_JOBS_TIMEOUT_HOURS",
                4,
            )),
            rate_limit_tokens_per_interval: env_parsed(
                "RECONCILIATION_RATE_LIMIT_TOKENS_PER_INTERVAL",
                5,
            ),
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            max_db_connections: env_parsed("VAULT_RECON_MAX_DB_CONNECTIONS", 10),
            bind_addr,
            worker_enabled: env_parsed("RECONCILIATION_WORKER_ENABLED", true),
            blockbook_base_url: env_or(
                "APIS_BLOCKBOOK_BASE_URL",
                "https://blockbook.example.invalid",
            ),
            worker,
            worker_stop_timeout: std::time::Duration::from_secs(env_parsed(
                "VAULT_RECON_SHUTDOWN_TIMEOUT_SECS",
                30,
            )),
        })
    }
}
