use crate::reorg;
use chrono::DateTime;
use chrono::Utc;
use vault_recon_provider::ProviderRegistry;
use vault_recon_store::AuditRepo;
use vault_recon_store::AddressRepo;
use vault_recon_store::AuditEntry;
use vault_recon_store::JobMode;
use vault_recon_store::JobRepo;
use vault_recon_store::JobSummary;
use vault_recon_store::NewJob;
use vault_recon_store::ReconciliationJob;
use vault_recon_types::ChainAlias;
use vault_recon_types::Error;
use vault_recon_types::JobId;
use vault_recon_types::Result;

/// Inbound request to create a reconciliation job (§4.2 `createJob`).
#[derive(Debug, Clone, Default)]
pub struct CreateJobInput {
    pub address: String,
    pub chain_alias: String,
    pub mode: Option<JobMode>,
    pub from_block: Option<i64>,
    pub to_block: Option<i64>,
    pub from_timestamp: Option<DateTime<Utc>>,
    pub to_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct JobWithAudit {
    pub job: ReconciliationJob,
    pub audit_log: Vec<AuditEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone)]
pub struct JobList {
    pub data: Vec<JobSummary>,
    pub total: i64,
}

/// API-facing layer in front of the job store: validates creation requests,
/// computes reorg-safe windows, and surfaces jobs with their audit trail
/// (§4.2). Does not itself process jobs — that is `vault-recon-worker`.
#[derive(Clone)]
pub struct ReconciliationService {
    jobs: JobRepo,
    addresses: AddressRepo,
    audit: AuditRepo,
    providers: ProviderRegistry,
}

impl ReconciliationService {
    pub fn new(
        jobs: JobRepo,
        addresses: AddressRepo,
        audit: AuditRepo,
        providers: ProviderRegistry,
    ) -> Self {
        Self {
            jobs,
            addresses,
            audit,
            providers,
        }
    }

    pub async fn find_active_job(
        &self,
        address: &str,
        chain_alias: &str,
    ) -> Result<Option<ReconciliationJob>> {
        self.jobs.find_active(address, chain_alias).await
    }

    /// Succeeds only for `pending` jobs (§4.2 `deleteJob`).
    pub async fn delete_job(&self, id: JobId) -> Result<bool> {
        self.jobs.delete_if_pending(id).await
    }

    pub async fn create_job(&self, input: CreateJobInput) -> Result<ReconciliationJob> {
        let chain = ChainAlias::from(input.chain_alias.as_str());
        let provider = self
            .providers
            .resolve(&chain)
            .ok_or_else(|| Error::Validation(format!("no provider configured for {chain}")))?;

        let mut mode = input.mode.unwrap_or(JobMode::Partial);
        let mut from_block = input.from_block;

        if mode == JobMode::Partial && from_block.is_none() {
            let address_row = self.addresses.get(&input.address, &input.chain_alias).await?;
            match address_row.and_then(|row| row.last_reconciled_block) {
                None => mode = JobMode::Full,
                Some(checkpoint) => {
                    from_block = Some(reorg::safe_from_block(checkpoint, &input.chain_alias));
                }
            }
        }

        self.jobs
            .create(NewJob {
                address: input.address,
                chain_alias: input.chain_alias,
                provider: provider.name().to_string(),
                mode,
                from_block,
                to_block: input.to_block,
                from_timestamp: input.from_timestamp,
                to_timestamp: input.to_timestamp,
            })
            .await
    }

    pub async fn get_job(&self, id: JobId) -> Result<Option<JobWithAudit>> {
        let Some(job) = self.jobs.get(id).await? else {
            return Ok(None);
        };
        let audit_log = self.audit.list_for_job(id).await?;
        Ok(Some(JobWithAudit { job, audit_log }))
    }

    pub async fn list_jobs(
        &self,
        address: &str,
        chain_alias: &str,
        page: Page,
    ) -> Result<JobList> {
        let (data, total) = self.jobs.list(address, chain_alias, page.limit, page.offset).await?;
        Ok(JobList { data, total })
    }
}
