use crate::async_flow;
use crate::context::WorkerContext;
use crate::sync_flow;
use chrono::DateTime;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;
use vault_recon_provider::ProviderRegistry;
use vault_recon_store::JobProgress;
use vault_recon_store::ReconciliationJob;
use vault_recon_types::ChainAlias;
use vault_recon_types::Result;

/// §4.3 the reconciliation worker. Continuously claims pending jobs and
/// drives them to a terminal state, subject to bounded concurrency, rate
/// limiting, and the stale-job sweep.
///
/// Owned behind an `Arc` so the polling loop and every spawned `processJob`
/// task share one handle; modelled on the `SessionTask` spawn/cancel shape
/// used for turn tasks in the teacher's core crate.
pub struct Worker {
    ctx: WorkerContext,
    providers: ProviderRegistry,
    cancellation: CancellationToken,
    active_jobs: AtomicUsize,
    idle: Notify,
}

impl Worker {
    pub fn new(ctx: WorkerContext, providers: ProviderRegistry) -> Arc<Self> {
        Arc::new(Self {
            ctx,
            providers,
            cancellation: CancellationToken::new(),
            active_jobs: AtomicUsize::new(0),
            idle: Notify::new(),
        })
    }

    /// Enters the polling loop on a background task (§4.3.1). Dropping the
    /// returned handle aborts the loop; prefer [`Worker::stop`] for a clean
    /// shutdown that lets in-flight jobs finish.
    pub fn start(self: &Arc<Self>) -> AbortOnDropHandle<()> {
        let worker = Arc::clone(self);
        AbortOnDropHandle::new(tokio::spawn(async move { worker.run_loop().await }))
    }

    /// Flips the stop flag and waits up to `timeout` for in-flight jobs to
    /// finish. Past the timeout, returns anyway and leaves any still-running
    /// jobs for the stale-job sweeper to reclaim (§4.3.1).
    pub async fn stop(&self, timeout: Duration) {
        self.cancellation.cancel();
        let wait_for_idle = async {
            while self.active_jobs.load(Ordering::SeqCst) > 0 {
                self.idle.notified().await;
            }
        };
        if tokio::time::timeout(timeout, wait_for_idle).await.is_err() {
            tracing::warn!(
                active_jobs = self.active_jobs.load(Ordering::SeqCst),
                "stop timed out with jobs still in flight; the stale-job sweeper will recover them"
            );
        }
    }

    async fn run_loop(self: Arc<Self>) {
        let mut last_sweep = self.ctx.clock.now();
        while !self.cancellation.is_cancelled() {
            if let Err(err) = self.tick(&mut last_sweep).await {
                tracing::error!(error = %err, "error in worker polling loop, sleeping before retry");
                self.sleep_poll_interval().await;
            }
        }
    }

    async fn tick(self: &Arc<Self>, last_sweep: &mut DateTime<Utc>) -> Result<()> {
        if self.ctx.clock.now() - *last_sweep >= self.ctx.config.stale_sweep_interval {
            let cutoff = self.ctx.clock.now() - self.ctx.config.stale_job_age;
            match self.ctx.jobs.sweep_stale(cutoff).await {
                Ok(reclaimed) if reclaimed > 0 => {
                    tracing::info!(reclaimed, "stale-job sweep reclaimed jobs");
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "stale-job sweep failed"),
            }
            *last_sweep = self.ctx.clock.now();
        }

        if self.active_jobs.load(Ordering::SeqCst) >= self.ctx.config.max_concurrent_jobs {
            self.sleep_poll_interval().await;
            return Ok(());
        }

        // A multi-pass async job (§4.3.5) never shows up as `pending`; it
        // stays `running` across the start/poll/complete sequence, so it
        // needs its own due-based claim once there is no pending work.
        let claimed = match self.ctx.jobs.claim_next_pending().await? {
            Some(job) => Some(job),
            None => {
                let due_before = self.ctx.clock.now()
                    - chrono::Duration::milliseconds(self.ctx.config.polling_interval_ms as i64);
                self.ctx.jobs.claim_next_async_due(due_before).await?
            }
        };

        match claimed {
            Some(job) => self.spawn_job(job),
            None => self.sleep_poll_interval().await,
        }
        Ok(())
    }

    async fn sleep_poll_interval(&self) {
        tokio::time::sleep(Duration::from_millis(self.ctx.config.polling_interval_ms)).await;
    }

    fn spawn_job(self: &Arc<Self>, job: ReconciliationJob) {
        self.active_jobs.fetch_add(1, Ordering::SeqCst);
        let worker = Arc::clone(self);
        tokio::spawn(async move {
            worker.process_job(job).await;
            if worker.active_jobs.fetch_sub(1, Ordering::SeqCst) == 1 {
                worker.idle.notify_waiters();
            }
        });
    }

    async fn process_job(&self, job: ReconciliationJob) {
        let job_id = job.id;
        let chain_alias = ChainAlias::new(job.chain_alias.clone());
        let Some(provider) = self.providers.resolve(&chain_alias) else {
            tracing::error!(job_id = %job_id, chain = %job.chain_alias, "no provider registered for chain");
            if let Err(err) = self.ctx.jobs.fail(job_id, &JobProgress::default()).await {
                tracing::error!(error = %err, job_id = %job_id, "failed to mark job failed after missing provider");
            }
            return;
        };

        let use_async_flow =
            provider.supports_async_jobs(&job.chain_alias) && self.ctx.config.async_jobs_enabled;

        let result = if use_async_flow {
            async_flow::run(&self.ctx, provider, job).await
        } else {
            sync_flow::run(&self.ctx, provider, job).await
        };

        if let Err(err) = result {
            tracing::warn!(error = %err, job_id = %job_id, "job processing ended in error");
        }
    }
}
