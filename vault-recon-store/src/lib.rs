#![deny(clippy::print_stdout, clippy::print_stderr)]

mod model;
mod pool;
mod repo;

pub use model::Actor;
pub use model::ActorType;
pub use model::Address;
pub use model::AuditAction;
pub use model::AuditEntry;
pub use model::ComparedField;
pub use model::JobMode;
pub use model::JobProgress;
pub use model::JobStatus;
pub use model::NewAuditEntry;
pub use model::NewTransaction;
pub use model::ReconciliationJob;
pub use model::Token;
pub use model::TokenMetadata;
pub use model::Transaction;
pub use model::Workflow;
pub use model::WorkflowContext;
pub use model::WorkflowEvent;
pub use model::WorkflowState;

pub use pool::connect;

pub use repo::AddressRepo;
pub use repo::AuditRepo;
pub use repo::JobCheckpoint;
pub use repo::JobRepo;
pub use repo::JobSummary;
pub use repo::NewJob;
pub use repo::NewWorkflow;
pub use repo::TokenRepo;
pub use repo::TransactionRepo;
pub use repo::WorkflowRepo;
