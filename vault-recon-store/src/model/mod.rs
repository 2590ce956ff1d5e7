mod address;
mod audit;
mod job;
mod token;
mod transaction;
mod workflow;

pub use address::Address;
pub(crate) use address::AddressRow;
pub use audit::AuditAction;
pub use audit::AuditEntry;
pub use audit::NewAuditEntry;
pub(crate) use audit::AuditEntryRow;
pub use job::JobMode;
pub use job::JobProgress;
pub use job::JobStatus;
pub use job::ReconciliationJob;
pub(crate) use job::JobRow;
pub use token::Token;
pub use token::TokenMetadata;
pub(crate) use token::TokenRow;
pub use transaction::ComparedField;
pub use transaction::NewTransaction;
pub use transaction::Transaction;
pub(crate) use transaction::TransactionRow;
pub use workflow::Actor;
pub use workflow::ActorType;
pub use workflow::Workflow;
pub use workflow::WorkflowContext;
pub use workflow::WorkflowEvent;
pub use workflow::WorkflowState;
pub(crate) use workflow::WorkflowEventRow;
pub(crate) use workflow::WorkflowRow;
