use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use vault_recon_types::Error;

/// Maps the shared error taxonomy onto HTTP status codes (§7). Auth-related
/// codes (`401`/`403`/`419`) are listed in the spec's HTTP surface but have
/// no corresponding error variant here — this core has no auth subsystem,
/// so they're never produced by these handlers.
pub struct ApiError(Error);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::WorkflowNotFound(_) | Error::JobNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidStateTransition { .. }
            | Error::ConcurrentModification { .. }
            | Error::UniquenessViolation { .. } => StatusCode::CONFLICT,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Provider(_) => StatusCode::BAD_GATEWAY,
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
