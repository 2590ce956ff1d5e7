#![deny(clippy::print_stdout, clippy::print_stderr)]

//! Shared vocabulary for the reconciliation core: chain identity, ids, the
//! error taxonomy, and the injectable clock. No business logic lives here.

mod chain;
mod clock;
mod error;
mod ids;

pub use chain::ChainAlias;
pub use chain::Ecosystem;
pub use chain::normalize;
pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use error::Error;
pub use error::ProviderError;
pub use error::Result;
pub use ids::AddressId;
pub use ids::JobId;
pub use ids::WorkflowId;
