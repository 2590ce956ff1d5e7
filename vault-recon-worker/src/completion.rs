use crate::context::effective_range;
use crate::context::WorkerContext;
use serde_json::json;
use std::collections::HashSet;
use vault_recon_store::AuditAction;
use vault_recon_store::JobProgress;
use vault_recon_store::NewAuditEntry;
use vault_recon_store::ReconciliationJob;
use vault_recon_store::Transaction;
use vault_recon_types::Result;

pub fn transaction_snapshot(tx: &Transaction) -> serde_json::Value {
    json!({
        "txHash": tx.tx_hash,
        "blockNumber": tx.block_number,
        "fromAddress": tx.from_address,
        "toAddress": tx.to_address,
        "fee": tx.fee.to_string(),
        "status": tx.status,
    })
}

/// §4.3.7 job completion. `matched_hashes` is `Some` only for the async
/// single-batch case, where orphan detection still needs to run here rather
/// than inline (§4.3.5 step "isComplete = true").
pub async fn complete_job(
    ctx: &WorkerContext,
    job: &ReconciliationJob,
    mut progress: JobProgress,
    final_block: Option<i64>,
    matched_hashes: Option<&HashSet<String>>,
) -> Result<()> {
    if let Some(matched_hashes) = matched_hashes {
        let (from_block, to_block) = effective_range(job, final_block);
        let locals = ctx
            .transactions
            .list_in_range(&job.chain_alias, &job.address, from_block, to_block)
            .await?;
        for tx in locals {
            if matched_hashes.contains(&tx.tx_hash.to_lowercase()) {
                continue;
            }
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
    }

    ctx.jobs.complete(job.id, &progress).await?;

    if let Some(final_block) = final_block {
        if let Err(err) = ctx
            .addresses
            .advance_last_reconciled_block(&job.address, &job.chain_alias, final_block)
            .await
        {
            tracing::warn!(
                error = %err,
                job_id = %job.id.0,
                "failed to advance last_reconciled_block, leaving it for the next job"
            );
        }
    }

    Ok(())
}
