mod address_repo;
mod audit_repo;
mod job_repo;
mod token_repo;
mod transaction_repo;
mod workflow_repo;

pub use address_repo::AddressRepo;
pub use audit_repo::AuditRepo;
pub use job_repo::JobCheckpoint;
pub use job_repo::JobRepo;
pub use job_repo::JobSummary;
pub use job_repo::NewJob;
pub use token_repo::TokenRepo;
pub use transaction_repo::TransactionRepo;
pub use workflow_repo::NewWorkflow;
pub use workflow_repo::WorkflowRepo;
