use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use vault_recon_types::JobId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> vault_recon_types::Result<Self> {
        Ok(match value {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            other => {
                return Err(vault_recon_types::Error::Validation(format!(
                    "unknown job status: {other}"
                )));
            }
        })
    }

    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Running)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobMode {
    Full,
    Partial,
}

impl JobMode {
    pub fn as_str(self) -> &'static str {
        match self {
            JobMode::Full => "full",
            JobMode::Partial => "partial",
        }
    }

    pub fn parse(value: &str) -> vault_recon_types::Result<Self> {
        Ok(match value {
            "full" => Self::Full,
            "partial" => Self::Partial,
            other => {
                return Err(vault_recon_types::Error::Validation(format!(
                    "unknown job mode: {other}"
                )));
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReconciliationJob {
    pub id: JobId,
    pub address: String,
    pub chain_alias: String,
    pub provider: String,
    pub mode: JobMode,
    pub status: JobStatus,
    pub from_block: Option<i64>,
    pub to_block: Option<i64>,
    pub from_timestamp: Option<DateTime<Utc>>,
    pub to_timestamp: Option<DateTime<Utc>>,
    pub last_processed_cursor: Option<String>,
    pub processed_count: i64,
    pub transactions_added: i64,
    pub transactions_soft_deleted: i64,
    pub discrepancies_flagged: i64,
    pub errors_count: i64,
    pub final_block: Option<i64>,
    pub async_job_id: Option<String>,
    pub async_next_page_url: Option<String>,
    pub async_job_started_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Progress counters touched by a checkpoint write (§4.3.6). Grouped so
/// `checkpoint_job` takes one argument instead of five.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobProgress {
    pub processed_count: i64,
    pub transactions_added: i64,
    pub transactions_soft_deleted: i64,
    pub discrepancies_flagged: i64,
    pub errors_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct JobRow {
    pub(crate) id: uuid::Uuid,
    pub(crate) address: String,
    pub(crate) chain_alias: String,
    pub(crate) provider: String,
    pub(crate) mode: String,
    pub(crate) status: String,
    pub(crate) from_block: Option<i64>,
    pub(crate) to_block: Option<i64>,
    pub(crate) from_timestamp: Option<DateTime<Utc>>,
    pub(crate) to_timestamp: Option<DateTime<Utc>>,
    pub(crate) last_processed_cursor: Option<String>,
    pub(crate) processed_count: i64,
    pub(crate) transactions_added: i64,
    pub(crate) transactions_soft_deleted: i64,
    pub(crate) discrepancies_flagged: i64,
    pub(crate) errors_count: i64,
    pub(crate) final_block: Option<i64>,
    pub(crate) async_job_id: Option<String>,
    pub(crate) async_next_page_url: Option<String>,
    pub(crate) async_job_started_at: Option<DateTime<Utc>>,
    pub(crate) started_at: Option<DateTime<Utc>>,
    pub(crate) completed_at: Option<DateTime<Utc>>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for ReconciliationJob {
    type Error = vault_recon_types::Error;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(ReconciliationJob {
            id: JobId(row.id),
            address: row.address,
            chain_alias: row.chain_alias,
            provider: row.provider,
            mode: JobMode::parse(&row.mode)?,
            status: JobStatus::parse(&row.status)?,
            from_block: row.from_block,
            to_block: row.to_block,
            from_timestamp: row.from_timestamp,
            to_timestamp: row.to_timestamp,
            last_processed_cursor: row.last_processed_cursor,
            processed_count: row.processed_count,
            transactions_added: row.transactions_added,
            transactions_soft_deleted: row.transactions_soft_deleted,
            discrepancies_flagged: row.discrepancies_flagged,
            errors_count: row.errors_count,
            final_block: row.final_block,
            async_job_id: row.async_job_id,
            async_next_page_url: row.async_next_page_url,
            async_job_started_at: row.async_job_started_at,
            started_at: row.started_at,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
