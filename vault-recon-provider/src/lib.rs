#![deny(clippy::print_stdout, clippy::print_stderr)]

mod blockbook;
mod gateway;
mod mock;
mod registry;
mod types;

pub use blockbook::BlockbookProvider;
pub use gateway::ProviderGateway;
pub use gateway::ProviderResult;
pub use mock::MockProvider;
pub use registry::ProviderRegistry;
pub use types::AsyncJobHandle;
pub use types::AsyncJobPage;
pub use types::AsyncJobRange;
pub use types::FetchOptions;
pub use types::NormalizedFields;
pub use types::ProviderTransaction;
pub use types::TransactionPage;
