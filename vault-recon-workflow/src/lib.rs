#![deny(clippy::print_stdout, clippy::print_stderr)]

mod orchestrator;
mod transitions;

pub use orchestrator::CreateWorkflowInput;
pub use orchestrator::Orchestrator;
pub use transitions::apply;
pub use transitions::Event;
pub use transitions::DEFAULT_MAX_BROADCAST_ATTEMPTS;
