use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use vault_recon_service::CreateJobInput;
use vault_recon_service::JobList;
use vault_recon_service::JobWithAudit;
use vault_recon_store::Actor;
use vault_recon_store::AuditEntry;
use vault_recon_store::JobMode;
use vault_recon_store::JobSummary;
use vault_recon_store::ReconciliationJob;
use vault_recon_store::Workflow;
use vault_recon_store::WorkflowEvent;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub mode: Option<JobMode>,
    pub from_block: Option<i64>,
    pub to_block: Option<i64>,
    pub from_timestamp: Option<DateTime<Utc>>,
    pub to_timestamp: Option<DateTime<Utc>>,
}

impl CreateJobRequest {
    pub fn into_input(self, address: String, chain_alias: String) -> CreateJobInput {
        CreateJobInput {
            address,
            chain_alias,
            mode: self.mode,
            from_block: self.from_block,
            to_block: self.to_block,
            from_timestamp: self.from_timestamp,
            to_timestamp: self.to_timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

const DEFAULT_PAGE_LIMIT: i64 = 50;

impl ListJobsQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: String,
    pub address: String,
    pub chain_alias: String,
    pub provider: String,
    pub mode: JobMode,
    pub status: String,
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
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ReconciliationJob> for JobResponse {
    fn from(job: &ReconciliationJob) -> Self {
        Self {
            id: job.id.to_string(),
            address: job.address.clone(),
            chain_alias: job.chain_alias.clone(),
            provider: job.provider.clone(),
            mode: job.mode,
            status: job.status.as_str().to_string(),
            from_block: job.from_block,
            to_block: job.to_block,
            from_timestamp: job.from_timestamp,
            to_timestamp: job.to_timestamp,
            last_processed_cursor: job.last_processed_cursor.clone(),
            processed_count: job.processed_count,
            transactions_added: job.transactions_added,
            transactions_soft_deleted: job.transactions_soft_deleted,
            discrepancies_flagged: job.discrepancies_flagged,
            errors_count: job.errors_count,
            final_block: job.final_block,
            started_at: job.started_at,
            completed_at: job.completed_at,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryResponse {
    pub id: String,
    pub transaction_hash: String,
    pub action: String,
    pub before_snapshot: Option<serde_json::Value>,
    pub after_snapshot: Option<serde_json::Value>,
    pub discrepancy_fields: Vec<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&AuditEntry> for AuditEntryResponse {
    fn from(entry: &AuditEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            transaction_hash: entry.transaction_hash.clone(),
            action: entry.action.as_str().to_string(),
            before_snapshot: entry.before_snapshot.clone(),
            after_snapshot: entry.after_snapshot.clone(),
            discrepancy_fields: entry.discrepancy_fields.clone(),
            error_message: entry.error_message.clone(),
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobWithAuditResponse {
    #[serde(flatten)]
    pub job: JobResponse,
    pub audit_log: Vec<AuditEntryResponse>,
}

impl From<&JobWithAudit> for JobWithAuditResponse {
    fn from(value: &JobWithAudit) -> Self {
        Self {
            job: JobResponse::from(&value.job),
            audit_log: value.audit_log.iter().map(AuditEntryResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummaryResponse {
    pub job_id: String,
    pub status: String,
    pub address: String,
    pub chain_alias: String,
    pub created_at: DateTime<Utc>,
}

impl From<&JobSummary> for JobSummaryResponse {
    fn from(summary: &JobSummary) -> Self {
        Self {
            job_id: summary.job_id.to_string(),
            status: summary.status.as_str().to_string(),
            address: summary.address.clone(),
            chain_alias: summary.chain_alias.clone(),
            created_at: summary.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListResponse {
    pub data: Vec<JobSummaryResponse>,
    pub total: i64,
}

impl From<&JobList> for JobListResponse {
    fn from(list: &JobList) -> Self {
        Self {
            data: list.data.iter().map(JobSummaryResponse::from).collect(),
            total: list.total,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkflowRequest {
    pub vault_id: String,
    pub chain_alias: String,
    pub marshalled_hex: String,
    pub organisation_id: String,
    pub created_by: Actor,
    #[serde(default)]
    pub skip_review: bool,
}

/// Every workflow-event action carries who triggered it (§4.1 `triggeredBy`).
/// `confirm`/`review` need nothing else.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub triggered_by: Actor,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    pub triggered_by: Actor,
    pub approved_by: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    pub triggered_by: Actor,
    pub rejected_by: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResponse {
    pub id: String,
    pub state: String,
    pub context: serde_json::Value,
    pub version: i64,
    pub vault_id: String,
    pub chain_alias: String,
    pub organisation_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Workflow> for WorkflowResponse {
    fn from(workflow: &Workflow) -> Self {
        Self {
            id: workflow.id.to_string(),
            state: workflow.state.as_str().to_string(),
            context: workflow.context.0.clone(),
            version: workflow.version,
            vault_id: workflow.vault_id.clone(),
            chain_alias: workflow.chain_alias.clone(),
            organisation_id: workflow.organisation_id.clone(),
            created_at: workflow.created_at,
            updated_at: workflow.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEventResponse {
    pub id: String,
    pub event_type: String,
    pub event_payload: serde_json::Value,
    pub from_state: String,
    pub to_state: String,
    pub triggered_by: Actor,
    pub created_at: DateTime<Utc>,
}

impl From<&WorkflowEvent> for WorkflowEventResponse {
    fn from(event: &WorkflowEvent) -> Self {
        Self {
            id: event.id.to_string(),
            event_type: event.event_type.clone(),
            event_payload: event.event_payload.clone(),
            from_state: event.from_state.as_str().to_string(),
            to_state: event.to_state.as_str().to_string(),
            triggered_by: event.triggered_by.clone(),
            created_at: event.created_at,
        }
    }
}
