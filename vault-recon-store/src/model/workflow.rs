use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use vault_recon_types::WorkflowId;

/// Who or what triggered a workflow transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ActorType {
    User,
    System,
    Webhook,
}

impl ActorType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActorType::User => "User",
            ActorType::System => "System",
            ActorType::Webhook => "Webhook",
        }
    }

    pub fn parse(value: &str) -> vault_recon_types::Result<Self> {
        match value {
            "User" => Ok(Self::User),
            "System" => Ok(Self::System),
            "Webhook" => Ok(Self::Webhook),
            other => Err(vault_recon_types::Error::Validation(format!(
                "invalid actor type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActorType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Created,
    Review,
    EvaluatingPolicies,
    WaitingApproval,
    Approved,
    WaitingSignature,
    Broadcasting,
    Indexing,
    Completed,
    Failed,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Created => "created",
            WorkflowState::Review => "review",
            WorkflowState::EvaluatingPolicies => "evaluating_policies",
            WorkflowState::WaitingApproval => "waiting_approval",
            WorkflowState::Approved => "approved",
            WorkflowState::WaitingSignature => "waiting_signature",
            WorkflowState::Broadcasting => "broadcasting",
            WorkflowState::Indexing => "indexing",
            WorkflowState::Completed => "completed",
            WorkflowState::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> vault_recon_types::Result<Self> {
        Ok(match value {
            "created" => Self::Created,
            "review" => Self::Review,
            "evaluating_policies" => Self::EvaluatingPolicies,
            "waiting_approval" => Self::WaitingApproval,
            "approved" => Self::Approved,
            "waiting_signature" => Self::WaitingSignature,
            "broadcasting" => Self::Broadcasting,
            "indexing" => Self::Indexing,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            other => {
                return Err(vault_recon_types::Error::Validation(format!(
                    "unknown workflow state: {other}"
                )));
            }
        })
    }

    pub fn is_final(&self) -> bool {
        matches!(self, WorkflowState::Completed | WorkflowState::Failed)
    }
}

/// Free-form bag of fields accumulated as a workflow transitions. Kept as a
/// JSON value rather than a fixed struct because different transitions
/// populate different subsets of it (see `spec.md` §4.1's context-effect
/// column), mirroring how the source system stores workflow context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowContext(pub Value);

impl WorkflowContext {
    pub fn empty() -> Self {
        Self(Value::Object(serde_json::Map::new()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        if let Value::Object(map) = &mut self.0 {
            map.insert(key.to_string(), value);
        }
    }

    pub fn broadcast_attempts(&self) -> u32 {
        self.get("broadcastAttempts")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32
    }
}

#[derive(Debug, Clone)]
pub struct Workflow {
    pub id: WorkflowId,
    pub state: WorkflowState,
    pub context: WorkflowContext,
    pub version: i64,
    pub vault_id: String,
    pub chain_alias: String,
    pub organisation_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WorkflowEvent {
    pub id: uuid::Uuid,
    pub workflow_id: WorkflowId,
    pub event_type: String,
    pub event_payload: Value,
    pub from_state: WorkflowState,
    pub to_state: WorkflowState,
    pub triggered_by: Actor,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct WorkflowRow {
    pub(crate) id: uuid::Uuid,
    pub(crate) state: String,
    pub(crate) context: Value,
    pub(crate) version: i64,
    pub(crate) vault_id: String,
    pub(crate) chain_alias: String,
    pub(crate) organisation_id: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl TryFrom<WorkflowRow> for Workflow {
    type Error = vault_recon_types::Error;

    fn try_from(row: WorkflowRow) -> Result<Self, Self::Error> {
        Ok(Workflow {
            id: WorkflowId(row.id),
            state: WorkflowState::parse(&row.state)?,
            context: WorkflowContext(row.context),
            version: row.version,
            vault_id: row.vault_id,
            chain_alias: row.chain_alias,
            organisation_id: row.organisation_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct WorkflowEventRow {
    pub(crate) id: uuid::Uuid,
    pub(crate) workflow_id: uuid::Uuid,
    pub(crate) event_type: String,
    pub(crate) event_payload: Value,
    pub(crate) from_state: String,
    pub(crate) to_state: String,
    pub(crate) triggered_by_id: String,
    pub(crate) triggered_by_type: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl TryFrom<WorkflowEventRow> for WorkflowEvent {
    type Error = vault_recon_types::Error;

    fn try_from(row: WorkflowEventRow) -> Result<Self, Self::Error> {
        Ok(WorkflowEvent {
            id: row.id,
            workflow_id: WorkflowId(row.workflow_id),
            event_type: row.event_type,
            event_payload: row.event_payload,
            from_state: WorkflowState::parse(&row.from_state)?,
            to_state: WorkflowState::parse(&row.to_state)?,
            triggered_by: Actor {
                id: row.triggered_by_id,
                kind: ActorType::parse(&row.triggered_by_type)?,
            },
            created_at: row.created_at,
        })
    }
}
