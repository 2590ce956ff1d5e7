use vault_recon_service::ReconciliationService;
use vault_recon_workflow::Orchestrator;

/// Shared application state, cloned per request (both members are already
/// cheaply-cloneable handles over a connection pool).
#[derive(Clone)]
pub struct AppState {
    pub reconciliation: ReconciliationService,
    pub workflows: Orchestrator,
}

impl AppState {
    pub fn new(reconciliation: ReconciliationService, workflows: Orchestrator) -> Self {
        Self {
            reconciliation,
            workflows,
        }
    }
}
