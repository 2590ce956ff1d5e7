use crate::transitions;
use crate::transitions::Event;
use vault_recon_store::Actor;
use vault_recon_store::NewWorkflow;
use vault_recon_store::Workflow;
use vault_recon_store::WorkflowContext;
use vault_recon_store::WorkflowEvent;
use vault_recon_store::WorkflowRepo;
use vault_recon_types::Result;
use vault_recon_types::WorkflowId;

/// Input to [`Orchestrator::create`]. `marshalled_hex` and `created_by` are
/// not modeled as workflow columns (only used to seed `context`); tracked
/// here so the HTTP layer has one struct to build from a request body.
#[derive(Debug, Clone)]
pub struct CreateWorkflowInput {
    pub vault_id: String,
    pub chain_alias: String,
    pub marshalled_hex: String,
    pub organisation_id: String,
    pub created_by: Actor,
    pub skip_review: bool,
}

/// Owns all writes to Workflow and Workflow Event rows (§3 "Ownership").
/// Thin orchestration over [`WorkflowRepo`]: rehydrate, validate the event
/// against [`transitions::apply`], persist.
#[derive(Clone)]
pub struct Orchestrator {
    repo: WorkflowRepo,
    max_broadcast_attempts: u32,
}

impl Orchestrator {
    pub fn new(repo: WorkflowRepo) -> Self {
        Self {
            repo,
            max_broadcast_attempts: transitions::DEFAULT_MAX_BROADCAST_ATTEMPTS,
        }
    }

    pub fn with_max_broadcast_attempts(mut self, max_broadcast_attempts: u32) -> Self {
        self.max_broadcast_attempts = max_broadcast_attempts;
        self
    }

    pub async fn create(&self, input: CreateWorkflowInput) -> Result<Workflow> {
        let mut initial_context = WorkflowContext::empty();
        initial_context.set(
            "marshalledHex",
            serde_json::Value::String(input.marshalled_hex),
        );
        initial_context.set(
            "createdBy",
            serde_json::to_value(&input.created_by)
                .map_err(|err| vault_recon_types::Error::Validation(err.to_string()))?,
        );
        initial_context.set("skipReview", serde_json::Value::Bool(input.skip_review));

        self.repo
            .create(NewWorkflow {
                vault_id: input.vault_id,
                chain_alias: input.chain_alias,
                organisation_id: input.organisation_id,
                initial_context,
            })
            .await
    }

    /// Begins the `created → review`/`evaluating_policies` transition,
    /// reading `skipReview` back from the context stashed at creation (§4.1
    /// `START`). The HTTP layer's `review` action routes here.
    pub async fn start(&self, id: WorkflowId, triggered_by: &Actor) -> Result<Workflow> {
        let current = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(vault_recon_types::Error::WorkflowNotFound(id.0))?;
        let skip_review = current
            .context
            .get("skipReview")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        self.send(id, Event::Start { skip_review }, triggered_by).await
    }

    /// Validates and applies one event, per `spec.md` §4.1 `send`.
    pub async fn send(
        &self,
        id: WorkflowId,
        event: Event,
        triggered_by: &Actor,
    ) -> Result<Workflow> {
        let current = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(vault_recon_types::Error::WorkflowNotFound(id.0))?;

        let (new_state, new_context) =
            transitions::apply(&current.state, &current.context, &event, self.max_broadcast_attempts)?;

        self.repo
            .apply_transition(
                id,
                current.version,
                new_state,
                new_context,
                event.type_name(),
                event.payload(),
                current.state,
                triggered_by,
            )
            .await
    }

    pub async fn get_by_id(&self, id: WorkflowId) -> Result<Option<Workflow>> {
        self.repo.get_by_id(id).await
    }

    pub async fn get_history(&self, id: WorkflowId) -> Result<Vec<WorkflowEvent>> {
        self.repo.get_history(id).await
    }
}
