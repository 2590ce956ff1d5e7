use crate::completion::complete_job;
use crate::completion::transaction_snapshot;
use crate::compare::mismatched_fields;
use crate::context::effective_range;
use crate::context::WorkerContext;
use crate::context::CHECKPOINT_INTERVAL;
use std::collections::HashMap;
use std::sync::Arc;
use vault_recon_provider::FetchOptions;
use vault_recon_provider::ProviderGateway;
use vault_recon_store::AuditAction;
use vault_recon_store::JobCheckpoint;
use vault_recon_store::JobProgress;
use vault_recon_store::NewAuditEntry;
use vault_recon_store::ReconciliationJob;
use vault_recon_store::Transaction;
use vault_recon_types::ChainAlias;
use vault_recon_types::Error;
use vault_recon_types::Result;

/// §4.3.4 sync streaming flow. On any error from steps 2-5, best-effort
/// checkpoints, marks the job `failed`, and appends an error audit entry —
/// the stale-job sweeper is the backstop if even that fails.
pub async fn run(
    ctx: &WorkerContext,
    provider: Arc<dyn ProviderGateway>,
    job: ReconciliationJob,
) -> Result<()> {
    let mut progress = JobProgress::default();
    let mut last_cursor = job.last_processed_cursor.clone();

    match run_inner(ctx, provider, &job, &mut progress, &mut last_cursor).await {
        Ok(()) => Ok(()),
        Err(err) => {
            fail(ctx, &job, progress, last_cursor, &err).await;
            Err(err)
        }
    }
}

async fn fail(
    ctx: &WorkerContext,
    job: &ReconciliationJob,
    mut progress: JobProgress,
    last_cursor: Option<String>,
    err: &Error,
) {
    let checkpoint = JobCheckpoint {
        progress,
        last_processed_cursor: last_cursor,
        async_next_page_url: None,
    };
    if let Err(checkpoint_err) = ctx.jobs.checkpoint(job.id, &checkpoint).await {
        tracing::error!(
            error = %checkpoint_err,
            job_id = %job.id,
            "best-effort checkpoint before failure also failed"
        );
    }

    progress.errors_count += 1;
    if let Err(fail_err) = ctx.jobs.fail(job.id, &progress).await {
        tracing::error!(
            error = %fail_err,
            job_id = %job.id,
            "failed to mark job failed; stale-job sweeper will recover it"
        );
    }

    if let Err(audit_err) = ctx
        .audit
        .append(NewAuditEntry {
            job_id: job.id,
            transaction_hash: "N/A".to_string(),
            action: AuditAction::Error,
            before_snapshot: None,
            after_snapshot: None,
            discrepancy_fields: Vec::new(),
            error_message: Some(err.to_string()),
        })
        .await
    {
        tracing::error!(error = %audit_err, job_id = %job.id, "failed to append error audit entry");
    }
}

async fn run_inner(
    ctx: &WorkerContext,
    provider: Arc<dyn ProviderGateway>,
    job: &ReconciliationJob,
    progress: &mut JobProgress,
    last_cursor: &mut Option<String>,
) -> Result<()> {
    let final_block = capture_final_block(ctx, provider.as_ref(), job).await;

    let (from_block, to_block) = effective_range(job, final_block);
    let locals = ctx
        .transactions
        .list_in_range(&job.chain_alias, &job.address, from_block, to_block)
        .await?;
    let mut local: HashMap<String, Transaction> = locals
        .into_iter()
        .map(|tx| (tx.tx_hash.to_lowercase(), tx))
        .collect();

    let ecosystem = ChainAlias::new(job.chain_alias.clone()).ecosystem();

    let mut options = FetchOptions {
        cursor: last_cursor.clone(),
        from_block: job.from_block,
        to_block: job.to_block,
        from_timestamp: job.from_timestamp,
        to_timestamp: job.to_timestamp,
    };

    loop {
        ctx.rate_limiter.acquire().await;
        let page = provider
            .fetch_transactions_page(&job.address, &job.chain_alias, options.clone())
            .await?;

        for tx in &page.transactions {
            let hash_key = tx.transaction_hash.to_lowercase();
            if let Some(local_tx) = local.remove(&hash_key) {
                let mismatches = mismatched_fields(&local_tx, &tx.normalized, ecosystem);
                if !mismatches.is_empty() {
                    ctx.audit
                        .append(NewAuditEntry {
                            job_id: job.id,
                            transaction_hash: tx.transaction_hash.clone(),
                            action: AuditAction::Discrepancy,
                            before_snapshot: Some(transaction_snapshot(&local_tx)),
                            after_snapshot: Some(tx.raw_data.clone()),
                            discrepancy_fields: mismatches.iter().map(ToString::to_string).collect(),
                            error_message: None,
                        })
                        .await?;
                    progress.discrepancies_flagged += 1;
                }
            } else {
                match ctx.processor.process(&job.chain_alias, tx).await {
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
                }
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

        if page.is_last {
            break;
        }
        options.cursor = page.next_cursor.clone();
    }

    // One final checkpoint before orphan detection (§4.3.6).
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

    for (_, tx) in local {
        ctx.audit
            .append(NewAuditEntry {
                job_id: job.id,
                transaction_hash: tx.tx_hash.clone(),
                action: AuditAction::SoftDeleted,
                before_snapshot: Some(transaction_snapshot(&tx)),
                after_snapshot: None,
                discrepancy_fields: Vec::new(),
                error_message: None,
            })
            .await?;
        ctx.transactions
            .mark_status(&job.chain_alias, &tx.tx_hash, "orphaned")
            .await?;
        progress.transactions_soft_deleted += 1;
    }

    complete_job(ctx, job, *progress, final_block, None).await
}

/// §4.3.4 step 1: pins the reorg-safety checkpoint before any transaction is
/// read, so a later job can never miss a block this one already saw. Failure
/// is logged but never fails the job — it proceeds with `finalBlock = None`.
async fn capture_final_block(
    ctx: &WorkerContext,
    provider: &dyn ProviderGateway,
    job: &ReconciliationJob,
) -> Option<i64> {
    if let Some(final_block) = job.final_block {
        return Some(final_block);
    }

    match provider.get_current_block_number(&job.chain_alias).await {
        Ok(Some(height)) => match ctx.jobs.set_final_block(job.id, height).await {
            Ok(()) => Some(height),
            Err(err) => {
                tracing::warn!(error = %err, job_id = %job.id, "failed to persist finalBlock, continuing without it");
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(error = %err, job_id = %job.id, "failed to query current block height, continuing without finalBlock");
            None
        }
    }
}
