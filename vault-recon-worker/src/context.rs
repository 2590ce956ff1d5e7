use crate::config::WorkerConfig;
use crate::processor::TransactionProcessor;
use crate::rate_limiter::RateLimiter;
use std::sync::Arc;
use vault_recon_store::AddressRepo;
use vault_recon_store::AuditRepo;
use vault_recon_store::JobMode;
use vault_recon_store::JobRepo;
use vault_recon_store::ReconciliationJob;
use vault_recon_store::TransactionRepo;
use vault_recon_types::Clock;

/// §4.3.6: checkpoints are written every this-many processed transactions.
pub const CHECKPOINT_INTERVAL: i64 = 100;

/// Repositories and collaborators shared by every in-flight job in one worker
/// process. Cloning is cheap: every repo wraps a pooled `PgPool`.
#[derive(Clone)]
pub struct WorkerContext {
    pub jobs: JobRepo,
    pub addresses: AddressRepo,
    pub transactions: TransactionRepo,
    pub audit: AuditRepo,
    pub processor: Arc<dyn TransactionProcessor>,
    pub rate_limiter: Arc<RateLimiter>,
    pub config: WorkerConfig,
    pub clock: Arc<dyn Clock>,
}

/// The `[fromBlock, toBlock]` range used both to build the local-transaction
/// map (§4.3.4 step 2) and to run orphan detection at completion (§4.3.7
/// step 1). `final_block` overrides `job.to_block` once captured, since it is
/// the tighter, reorg-safe upper bound pinned at job start.
pub fn effective_range(job: &ReconciliationJob, final_block: Option<i64>) -> (i64, i64) {
    let from_block = if job.mode == JobMode::Partial {
        job.from_block.unwrap_or(0)
    } else {
        0
    };
    let to_block = final_block.or(job.to_block).unwrap_or(i64::MAX);
    (from_block, to_block)
}
