use crate::dto::ActionRequest;
use crate::dto::ApproveRequest;
use crate::dto::CreateWorkflowRequest;
use crate::dto::RejectRequest;
use crate::dto::WorkflowEventResponse;
use crate::dto::WorkflowResponse;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use vault_recon_types::WorkflowId;
use vault_recon_workflow::CreateWorkflowInput;
use vault_recon_workflow::Event;

pub async fn create_workflow(
    State(state): State<AppState>,
    Json(body): Json<CreateWorkflowRequest>,
) -> Result<(StatusCode, Json<WorkflowResponse>), ApiError> {
    let workflow = state
        .workflows
        .create(CreateWorkflowInput {
            vault_id: body.vault_id,
            chain_alias: body.chain_alias,
            marshalled_hex: body.marshalled_hex,
            organisation_id: body.organisation_id,
            created_by: body.created_by,
            skip_review: body.skip_review,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(WorkflowResponse::from(&workflow))))
}

pub async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<WorkflowId>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    let workflow = state
        .workflows
        .get_by_id(id)
        .await?
        .ok_or(vault_recon_types::Error::WorkflowNotFound(id.0))?;
    Ok(Json(WorkflowResponse::from(&workflow)))
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<WorkflowId>,
) -> Result<Json<Vec<WorkflowEventResponse>>, ApiError> {
    let history = state.workflows.get_history(id).await?;
    Ok(Json(history.iter().map(WorkflowEventResponse::from).collect()))
}

/// `START`. Named `review` on the wire because that's where a workflow
/// created with `skipReview: false` lands (§4.1).
pub async fn review(
    State(state): State<AppState>,
    Path(id): Path<WorkflowId>,
    Json(body): Json<ActionRequest>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    let workflow = state.workflows.start(id, &body.triggered_by).await?;
    Ok(Json(WorkflowResponse::from(&workflow)))
}

pub async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<WorkflowId>,
    Json(body): Json<ActionRequest>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    let workflow = state
        .workflows
        .send(id, Event::Confirm, &body.triggered_by)
        .await?;
    Ok(Json(WorkflowResponse::from(&workflow)))
}

pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<WorkflowId>,
    Json(body): Json<ApproveRequest>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    let workflow = state
        .workflows
        .send(
            id,
            Event::Approve {
                approved_by: body.approved_by,
            },
            &body.triggered_by,
        )
        .await?;
    Ok(Json(WorkflowResponse::from(&workflow)))
}

pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<WorkflowId>,
    Json(body): Json<RejectRequest>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    let workflow = state
        .workflows
        .send(
            id,
            Event::Reject {
                rejected_by: body.rejected_by,
                reason: body.reason,
            },
            &body.triggered_by,
        )
        .await?;
    Ok(Json(WorkflowResponse::from(&workflow)))
}
