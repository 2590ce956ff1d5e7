mod config;

use crate::config::Config;
use std::sync::Arc;
use vault_recon_provider::BlockbookProvider;
use vault_recon_provider::ProviderRegistry;
use vault_recon_service::ReconciliationService;
use vault_recon_store::AddressRepo;
use vault_recon_store::AuditRepo;
use vault_recon_store::JobRepo;
use vault_recon_store::TokenRepo;
use vault_recon_store::TransactionRepo;
use vault_recon_store::WorkflowRepo;
use vault_recon_types::SystemClock;
use vault_recon_worker::DefaultTransactionProcessor;
use vault_recon_worker::RateLimiter;
use vault_recon_worker::Worker;
use vault_recon_worker::WorkerContext;
use vault_recon_workflow::Orchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    let pool = vault_recon_store::connect(&config.database_url, config.max_db_connections).await?;

    let jobs = JobRepo::new(pool.clone());
    let addresses = AddressRepo::new(pool.clone());
    let audit = AuditRepo::new(pool.clone());
    let transactions = TransactionRepo::new(pool.clone());
    let tokens = TokenRepo::new(pool.clone());
    let workflows = WorkflowRepo::new(pool.clone());

    let providers = ProviderRegistry::new()
        .with_default(Arc::new(BlockbookProvider::new(config.blockbook_base_url.clone())));

    let service = ReconciliationService::new(
        jobs.clone(),
        addresses.clone(),
        audit.clone(),
        providers.clone(),
    );
    let orchestrator = Orchestrator::new(workflows);
    let http_state = vault_recon_http::AppState::new(service, orchestrator);

    let worker_handle = if config.worker_enabled {
        let processor = DefaultTransactionProcessor::new(tokens, Box::new(SystemClock));
        let ctx = WorkerContext {
            jobs,
            addresses,
            transactions,
            audit,
            processor: Arc::new(processor),
            rate_limiter: Arc::new(RateLimiter::new(config.worker.rate_limit_tokens_per_interval)),
            config: config.worker.clone(),
            clock: Arc::new(SystemClock),
        };
        let worker = Worker::new(ctx, providers);
        let handle = worker.start();
        Some((worker, handle))
    } else {
        tracing::info!("reconciliation.workerEnabled is false; running HTTP surface only");
        None
    };

    tokio::select! {
        result = vault_recon_http::serve(http_state, config.bind_addr) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
        }
    }

    if let Some((worker, handle)) = worker_handle {
        worker.stop(config.worker_stop_timeout).await;
        drop(handle);
    }

    Ok(())
}
