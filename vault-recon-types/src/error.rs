use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the orchestrator, reconciliation service, and worker.
///
/// Variant names track the error *kinds* from the design's error-handling
/// section rather than any one component's internal types, so the HTTP layer
/// can map them to status codes without inspecting component-specific errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("workflow not found: {0}")]
    WorkflowNotFound(uuid::Uuid),

    #[error("reconciliation job not found: {0}")]
    JobNotFound(uuid::Uuid),

    #[error("event `{event}` is not legal from state `{state}`")]
    InvalidStateTransition { state: String, event: String },

    #[error("workflow {id} was modified concurrently; retry with a fresh read")]
    ConcurrentModification { id: uuid::Uuid },

    #[error("an active job already exists for {address} on {chain}")]
    UniquenessViolation { address: String, chain: String },

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(err.to_string())
    }
}

/// Distinguishes errors the worker should terminate a job for from ones it
/// should simply retry on the next poll pass.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transient provider error: {0}")]
    Transient(String),
    #[error("fatal provider error: {0}")]
    Fatal(String),
}

impl ProviderError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProviderError::Fatal(_))
    }
}
