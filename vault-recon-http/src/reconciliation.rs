use crate::dto::CreateJobRequest;
use crate::dto::JobListResponse;
use crate::dto::JobResponse;
use crate::dto::JobWithAuditResponse;
use crate::dto::ListJobsQuery;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use vault_recon_service::Page;
use vault_recon_store::JobStatus;
use vault_recon_types::JobId;

/// `POST .../reconcile` (§4.2, §6). Enforces the one-active-job-per-
/// (address, chain) invariant at this layer rather than in the service: a
/// `pending` job in the way is replaced outright, a `running` one is
/// returned as-is, and the partial unique index is the last line of defense
/// against a race between the check and the insert.
pub async fn create_job(
    State(state): State<AppState>,
    Path((address, chain_alias)): Path<(String, String)>,
    Json(body): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), ApiError> {
    if let Some(active) = state
        .reconciliation
        .find_active_job(&address, &chain_alias)
        .await?
    {
        if active.status == JobStatus::Running {
            return Ok((StatusCode::OK, Json(JobResponse::from(&active))));
        }
        if active.status == JobStatus::Pending {
            state.reconciliation.delete_job(active.id).await?;
        }
    }

    let job = state
        .reconciliation
        .create_job(body.into_input(address, chain_alias))
        .await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(&job))))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Path((address, chain_alias)): Path<(String, String)>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<JobListResponse>, ApiError> {
    let page = Page {
        limit: query.limit(),
        offset: query.offset(),
    };
    let list = state.reconciliation.list_jobs(&address, &chain_alias, page).await?;
    Ok(Json(JobListResponse::from(&list)))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> Result<Json<JobWithAuditResponse>, ApiError> {
    let job = state
        .reconciliation
        .get_job(job_id)
        .await?
        .ok_or(vault_recon_types::Error::JobNotFound(job_id.0))?;
    Ok(Json(JobWithAuditResponse::from(&job)))
}
