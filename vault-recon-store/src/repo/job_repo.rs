use crate::model::JobMode;
use crate::model::JobProgress;
use crate::model::JobRow;
use crate::model::JobStatus;
use crate::model::ReconciliationJob;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use vault_recon_types::Error;
use vault_recon_types::JobId;
use vault_recon_types::Result;

const JOB_COLUMNS: &str = r#"
    id, address, chain_alias, provider, mode, status, from_block, to_block,
    from_timestamp, to_timestamp, last_processed_cursor, processed_count,
    transactions_added, transactions_soft_deleted, discrepancies_flagged,
    errors_count, final_block, async_job_id, async_next_page_url,
    async_job_started_at, started_at, completed_at, created_at, updated_at
"#;

#[derive(Debug, Clone)]
pub struct NewJob {
    pub address: String,
    pub chain_alias: String,
    pub provider: String,
    pub mode: JobMode,
    pub from_block: Option<i64>,
    pub to_block: Option<i64>,
    pub from_timestamp: Option<DateTime<Utc>>,
    pub to_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct JobSummary {
    pub job_id: JobId,
    pub status: JobStatus,
    pub address: String,
    pub chain_alias: String,
    pub created_at: DateTime<Utc>,
}

/// Non-terminal progress write, the payload of a checkpoint (§4.3.6) and of
/// the periodic async-page persistence step (§4.3.5).
#[derive(Debug, Clone, Default)]
pub struct JobCheckpoint {
    pub progress: JobProgress,
    pub last_processed_cursor: Option<String>,
    pub async_next_page_url: Option<String>,
}

#[derive(Clone)]
pub struct JobRepo {
    pool: PgPool,
}

impl JobRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new pending job. The partial unique index on `(address,
    /// chain_alias) WHERE status IN ('pending', 'running')` (§6) is the
    /// final arbiter of the one-active-job invariant; a violation here is
    /// translated to [`Error::UniquenessViolation`] rather than the raw
    /// Postgres error, so a caller racing another worker gets a typed result.
    pub async fn create(&self, input: NewJob) -> Result<ReconciliationJob> {
        let id = JobId::new();
        let query = format!(
            r#"
            INSERT INTO reconciliation_jobs (
                id, address, chain_alias, provider, mode, status,
                from_block, to_block, from_timestamp, to_timestamp
            )
            VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8, $9)
            RETURNING {JOB_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(id.0)
            .bind(&input.address)
            .bind(&input.chain_alias)
            .bind(&input.provider)
            .bind(input.mode.as_str())
            .bind(input.from_block)
            .bind(input.to_block)
            .bind(input.from_timestamp)
            .bind(input.to_timestamp)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err.as_database_error().and_then(|d| d.code()) {
                Some(code) if code == "23505" => Error::UniquenessViolation {
                    address: input.address.clone(),
                    chain: input.chain_alias.clone(),
                },
                _ => Error::from(err),
            })?;
        row.try_into()
    }

    pub async fn find_active(
        &self,
        address: &str,
        chain_alias: &str,
    ) -> Result<Option<ReconciliationJob>> {
        let query = format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM reconciliation_jobs
            WHERE address = $1 AND chain_alias = $2 AND status IN ('pending', 'running')
            "#
        );
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(address)
            .bind(chain_alias)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// Deletes a job only while it is still `pending`, supporting the
    /// replace-a-pending-job flow of §4.2. Returns whether a row was removed.
    pub async fn delete_if_pending(&self, id: JobId) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM reconciliation_jobs WHERE id = $1 AND status = 'pending'",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get(&self, id: JobId) -> Result<Option<ReconciliationJob>> {
        let query = format!("SELECT {JOB_COLUMNS} FROM reconciliation_jobs WHERE id = $1");
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    pub async fn list(
        &self,
        address: &str,
        chain_alias: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<JobSummary>, i64)> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM reconciliation_jobs
            WHERE address = $1 AND chain_alias = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(address)
        .bind(chain_alias)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reconciliation_jobs WHERE address = $1 AND chain_alias = $2",
        )
        .bind(address)
        .bind(chain_alias)
        .fetch_one(&self.pool)
        .await?;

        let summaries = rows
            .into_iter()
            .map(|row| -> Result<JobSummary> {
                Ok(JobSummary {
                    job_id: JobId(row.id),
                    status: JobStatus::parse(&row.status)?,
                    address: row.address,
                    chain_alias: row.chain_alias,
                    created_at: row.created_at,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((summaries, total))
    }

    /// Claims the oldest pending job for this process, atomically, using
    /// `FOR UPDATE SKIP LOCKED` so N worker processes never claim the same
    /// row and a slow worker never blocks the others (§4.3.2 step 3, §5
    /// "Job claiming"). Grounded on the same CTE-plus-`SKIP LOCKED` shape
    /// used for Postgres job queues generally: lock candidate ids in a CTE,
    /// then `UPDATE ... WHERE id IN (SELECT id FROM candidates)`.
    pub async fn claim_next_pending(&self) -> Result<Option<ReconciliationJob>> {
        let query = format!(
            r#"
            WITH candidate AS (
                SELECT id
                FROM reconciliation_jobs
                WHERE status = 'pending'
                ORDER BY created_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE reconciliation_jobs
            SET status = 'running',
                started_at = COALESCE(started_at, now()),
                updated_at = now()
            WHERE id IN (SELECT id FROM candidate)
            RETURNING {JOB_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, JobRow>(&query)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// Claims a `running` async job that is due for its next poll, without
    /// touching `async_job_id`/`async_next_page_url`/`async_job_started_at`
    /// (§4.3.5: "the next claim picks up where it left off via the
    /// persisted asyncJobId/asyncNextPageUrl"). Mirrors
    /// [`JobRepo::claim_next_pending`]'s CTE-plus-`SKIP LOCKED` shape so two
    /// workers never re-poll the same job concurrently; bumping
    /// `updated_at` on claim doubles as the "don't reclaim me yet" marker
    /// for the next tick and keeps the job off the stale sweep while it is
    /// making progress.
    pub async fn claim_next_async_due(&self, due_before: DateTime<Utc>) -> Result<Option<ReconciliationJob>> {
        let query = format!(
            r#"
            WITH candidate AS (
                SELECT id
                FROM reconciliation_jobs
                WHERE status = 'running' AND async_job_id IS NOT NULL AND updated_at <= $1
                ORDER BY updated_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE reconciliation_jobs
            SET updated_at = now()
            WHERE id IN (SELECT id FROM candidate)
            RETURNING {JOB_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(due_before)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// Returns stale `running` jobs to `pending` and clears their async
    /// state, so a crashed worker's job is eventually picked up again
    /// (§4.3.2 step 1, §8 property 8). Returns the number of jobs reclaimed.
    /// `cutoff` is computed by the caller from its injected [`Clock`](vault_recon_types::Clock)
    /// rather than read here, so staleness math stays testable under a
    /// fixed clock.
    pub async fn sweep_stale(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE reconciliation_jobs
            SET status = 'pending',
                async_job_id = NULL,
                async_next_page_url = NULL,
                async_job_started_at = NULL,
                updated_at = now()
            WHERE status = 'running' AND updated_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Best-effort, non-terminal progress write (§4.3.6). Never touches
    /// `final_block`, which is pinned once at job start.
    pub async fn checkpoint(&self, id: JobId, checkpoint: &JobCheckpoint) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE reconciliation_jobs
            SET processed_count = $1,
                transactions_added = $2,
                transactions_soft_deleted = $3,
                discrepancies_flagged = $4,
                errors_count = $5,
                last_processed_cursor = COALESCE($6, last_processed_cursor),
                async_next_page_url = COALESCE($7, async_next_page_url),
                updated_at = now()
            WHERE id = $8
            "#,
        )
        .bind(checkpoint.progress.processed_count)
        .bind(checkpoint.progress.transactions_added)
        .bind(checkpoint.progress.transactions_soft_deleted)
        .bind(checkpoint.progress.discrepancies_flagged)
        .bind(checkpoint.progress.errors_count)
        .bind(&checkpoint.last_processed_cursor)
        .bind(&checkpoint.async_next_page_url)
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Pins `final_block` once, at job start (§4.3.4 step 1, §4.3.5 "no
    /// `asyncJobId` yet"). Never called again afterwards for this job.
    pub async fn set_final_block(&self, id: JobId, final_block: i64) -> Result<()> {
        sqlx::query(
            "UPDATE reconciliation_jobs SET final_block = $1, updated_at = now() WHERE id = $2 AND final_block IS NULL",
        )
        .bind(final_block)
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Persists the metadata returned by `startAsyncJob` (§4.3.5).
    pub async fn persist_async_start(
        &self,
        id: JobId,
        async_job_id: &str,
        async_next_page_url: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE reconciliation_jobs
            SET async_job_id = $1,
                async_next_page_url = $2,
                async_job_started_at = now(),
                updated_at = now()
            WHERE id = $3
            "#,
        )
        .bind(async_job_id)
        .bind(async_next_page_url)
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Clears async-job metadata: used on timeout, on corrupt-state
    /// detection, and by the stale sweeper.
    pub async fn clear_async_fields(&self, id: JobId) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE reconciliation_jobs
            SET async_job_id = NULL, async_next_page_url = NULL, async_job_started_at = NULL,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn complete(&self, id: JobId, progress: &JobProgress) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE reconciliation_jobs
            SET status = 'completed',
                completed_at = now(),
                processed_count = $1,
                transactions_added = $2,
                transactions_soft_deleted = $3,
                discrepancies_flagged = $4,
                errors_count = $5,
                updated_at = now()
            WHERE id = $6
            "#,
        )
        .bind(progress.processed_count)
        .bind(progress.transactions_added)
        .bind(progress.transactions_soft_deleted)
        .bind(progress.discrepancies_flagged)
        .bind(progress.errors_count)
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn fail(&self, id: JobId, progress: &JobProgress) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE reconciliation_jobs
            SET status = 'failed',
                completed_at = now(),
                processed_count = $1,
                transactions_added = $2,
                transactions_soft_deleted = $3,
                discrepancies_flagged = $4,
                errors_count = $5,
                async_job_id = NULL,
                async_next_page_url = NULL,
                async_job_started_at = NULL,
                updated_at = now()
            WHERE id = $6
            "#,
        )
        .bind(progress.processed_count)
        .bind(progress.transactions_added)
        .bind(progress.transactions_soft_deleted)
        .bind(progress.discrepancies_flagged)
        .bind(progress.errors_count)
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
