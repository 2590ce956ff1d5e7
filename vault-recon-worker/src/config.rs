use chrono::Duration;

/// §6 "Configuration (enumerated options)" plus §4.3 defaults. One flat
/// struct built by the binary from environment variables and handed to the
/// worker whole, rather than threaded field-by-field.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub polling_interval_ms: u64,
    pub max_concurrent_jobs: usize,
    pub stale_sweep_interval: Duration,
    pub stale_job_age: Duration,
    pub async_jobs_enabled: bool,
    pub async_job_timeout: Duration,
    pub rate_limit_tokens_per_interval: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: 5_000,
            max_concurrent_jobs: 4,
            stale_sweep_interval: Duration::minutes(5),
            stale_job_age: Duration::hours(1),
            async_jobs_enabled: false,
            async_job_timeout: Duration::hours(4),
            rate_limit_tokens_per_interval: 5,
        }
    }
}
