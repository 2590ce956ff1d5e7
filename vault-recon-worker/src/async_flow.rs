use crate::completion::complete_job;
use crate::compare::mismatched_fields;
use crate::context::WorkerContext;
use crate::context::CHECKPOINT_INTERVAL;
use std::collections::HashSet;
use std::sync::Arc;
use vault_recon_provider::AsyncJobRange;
use vault_recon_provider::ProviderGateway;
use vault_recon_provider::ProviderTransaction;
use vault_recon_store::AuditAction;
use vault_recon_store::JobCheckpoint;
use vault_recon_store::JobProgress;
use vault_recon_store::NewAuditEntry;
use vault_recon_store::ReconciliationJob;
use vault_recon_types::ChainAlias;
use vault_recon_types::Ecosystem;
use vault_recon_types::Result;

/// §4.3.5 async-job flow. Reentrant across polling passes: each call does at
/// most one provider interaction, driven entirely by the job row's persisted
/// `asyncJobId` / `asyncNextPageUrl` / `asyncJobStartedAt`, so a crash between
/// passes loses no progress beyond the last checkpoint. `Worker::tick` is
/// what re-dispatches a `running` job into a second call here, via
/// `JobRepo::claim_next_async_due`.
pub async fn run(
    ctx: &WorkerContext,
    provider: Arc<dyn ProviderGateway>,
    job: ReconciliationJob,
) -> Result<()> {
    let Some(async_job_id) = job.async_job_id.as_deref() else {
        return start(ctx, provider.as_ref(), &job).await;
    };

    if let Some(started_at) = job.async_job_started_at {
        if ctx.clock.now() - started_at > ctx.config.async_job_timeout {
            return timed_out(ctx, &job).await;
        }
    }

    let Some(next_page_url) = job.async_next_page_url.clone() else {
        tracing::error!(job_id = %job.id, async_job_id, "async job has no nextPageUrl; treating as corrupt state");
        return corrupt_state(ctx, &job).await;
    };

    poll(ctx, provider.as_ref(), &job, &next_page_url).await
}

async fn start(
    ctx: &WorkerContext,
    provider: &dyn ProviderGateway,
    job: &ReconciliationJob,
) -> Result<()> {
    let final_block = match provider.get_current_block_number(&job.chain_alias).await {
        Ok(height) => height,
        Err(err) => {
            tracing::warn!(error = %err, job_id = %job.id, "failed to query current block height before starting async job");
            None
        }
    };

    let handle = provider
        .start_async_job(
            &job.chain_alias,
            &job.address,
            AsyncJobRange {
                start_block: job.from_block,
                end_block: final_block,
            },
        )
        .await?;

    if let Some(final_block) = final_block {
        if let Err(err) = ctx.jobs.set_final_block(job.id, final_block).await {
            tracing::warn!(error = %err, job_id = %job.id, "failed to persist finalBlock for async job");
        }
    }

    ctx.jobs
        .persist_async_start(job.id, &handle.job_id, &handle.next_page_url)
        .await?;
    Ok(())
}

fn progress_snapshot(job: &ReconciliationJob) -> JobProgress {
    JobProgress {
        processed_count: job.processed_count,
        transactions_added: job.transactions_added,
        transactions_soft_deleted: job.transactions_soft_deleted,
        discrepancies_flagged: job.discrepancies_flagged,
        errors_count: job.errors_count,
    }
}

async fn timed_out(ctx: &WorkerContext, job: &ReconciliationJob) -> Result<()> {
    tracing::warn!(job_id = %job.id, "async job timed out, marking failed for retry");
    ctx.jobs.fail(job.id, &progress_snapshot(job)).await?;
    ctx.jobs.clear_async_fields(job.id).await?;
    append_error(ctx, job, "async job exceeded the configured timeout").await
}

async fn corrupt_state(ctx: &WorkerContext, job: &ReconciliationJob) -> Result<()> {
    ctx.jobs.fail(job.id, &progress_snapshot(job)).await?;
    ctx.jobs.clear_async_fields(job.id).await?;
    append_error(ctx, job, "async job metadata missing nextPageUrl").await
}

async fn append_error(ctx: &WorkerContext, job: &ReconciliationJob, message: &str) -> Result<()> {
    ctx.audit
        .append(NewAuditEntry {
            job_id: job.id,
            transaction_hash: "N/A".to_string(),
            action: AuditAction::Error,
            before_snapshot: None,
            after_snapshot: None,
            discrepancy_fields: Vec::new(),
            error_message: Some(message.to_string()),
        })
        .await?;
    Ok(())
}

async fn poll(
    ctx: &WorkerContext,
    provider: &dyn ProviderGateway,
    job: &ReconciliationJob,
    next_page_url: &str,
) -> Result<()> {
    let page = provider.fetch_async_job_results(next_page_url).await?;

    if !page.is_ready {
        return Ok(());
    }

    let is_single_batch = job.processed_count == 0;
    let ecosystem = ChainAlias::new(job.chain_alias.clone()).ecosystem();

    let mut progress = progress_snapshot(job);
    let mut last_cursor = job.last_processed_cursor.clone();
    let mut matched_hashes: HashSet<String> = HashSet::new();

    process_batch(
        ctx,
        job,
        ecosystem,
        &page.transactions,
        &mut progress,
        &mut last_cursor,
        &mut matched_hashes,
    )
    .await?;

    if page.is_complete {
        let matched = is_single_batch.then_some(&matched_hashes);
        complete_job(ctx, job, progress, job.final_block, matched).await
    } else {
        ctx.jobs
            .checkpoint(
                job.id,
                &JobCheckpoint {
                    progress,
                    last_processed_cursor: last_cursor,
                    async_next_page_url: page.next_page_url,
                },
            )
            .await?;
        Ok(())
    }
}

/// §4.3.5 "processProviderTransactions". Every hash seen in the batch is
/// added to `matched_hashes`, used for single-batch orphan detection at
/// completion; transactions absent locally are upserted and audited as
/// `added`, transactions already present are compared the same way the sync
/// flow does (§9 Open Question — the spec's async-flow text focuses on the
/// not-present-locally path, so this mirrors the sync flow for symmetry).
async fn process_batch(
    ctx: &WorkerContext,
    job: &ReconciliationJob,
    ecosystem: Ecosystem,
    transactions: &[ProviderTransaction],
    progress: &mut JobProgress,
    last_cursor: &mut Option<String>,
    matched_hashes: &mut HashSet<String>,
) -> Result<()> {
    for tx in transactions {
        matched_hashes.insert(tx.transaction_hash.to_lowercase());

        match ctx
            .transactions
            .get_by_hash(&job.chain_alias, &tx.transaction_hash)
            .await?
        {
            Some(local_tx) => {
                let mismatches = mismatched_fields(&local_tx, &tx.normalized, ecosystem);
                if !mismatches.is_empty() {
                    ctx.audit
                        .append(NewAuditEntry {
                            job_id: job.id,
                            transaction_hash: tx.transaction_hash.clone(),
                            action: AuditAction::Discrepancy,
                            before_snapshot: Some(crate::completion::transaction_snapshot(&local_tx)),
                            after_snapshot: Some(tx.raw_data.clone()),
                            discrepancy_fields: mismatches.iter().map(ToString::to_string).collect(),
                            error_message: None,
                        })
                        .await?;
                    progress.discrepancies_flagged += 1;
                }
            }
            None => match ctx.processor.process(&job.chain_alias, tx).await {
                Ok(new_tx) => {
                    ctx.transactions.upsert(new_tx).await?;
                    ctx.audit
                        .append(NewAuditEntry {
                            job_id: job.id,
                            transaction_hash: tx.transaction_hash.clone(),
                            action: AuditAction::Added,
                            before_snapshot: None,
                            after_snapshot: Some(tx.raw_data.clone()),
                            discrepancy_fields: Vec::new(),
                            error_message: None,
                        })
                        .await?;
                    progress.transactions_added += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        tx_hash = %tx.transaction_hash,
                        "transaction processor failed, counting as an error and continuing"
                    );
                    progress.errors_count += 1;
                }
            },
        }

        progress.processed_count += 1;
        *last_cursor = Some(tx.cursor.clone());

        if progress.processed_count % CHECKPOINT_INTERVAL == 0 {
            ctx.jobs
                .checkpoint(
                    job.id,
                    &JobCheckpoint {
                        progress: *progress,
                        last_processed_cursor: last_cursor.clone(),
                        async_next_page_url: None,
                    },
                )
                .await?;
        }
    }
    Ok(())
}
