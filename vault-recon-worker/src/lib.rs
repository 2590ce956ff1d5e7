#![deny(clippy::print_stdout, clippy::print_stderr)]

mod async_flow;
mod compare;
mod completion;
mod config;
mod context;
mod processor;
mod rate_limiter;
mod sync_flow;
mod worker;

pub use config::WorkerConfig;
pub use context::WorkerContext;
pub use context::CHECKPOINT_INTERVAL;
pub use processor::DefaultTransactionProcessor;
pub use processor::TransactionProcessor;
pub use rate_limiter::RateLimiter;
pub use worker::Worker;
