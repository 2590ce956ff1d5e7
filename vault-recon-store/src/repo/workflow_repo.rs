use crate::model::Actor;
use crate::model::Workflow;
use crate::model::WorkflowContext;
use crate::model::WorkflowEvent;
use crate::model::WorkflowEventRow;
use crate::model::WorkflowRow;
use crate::model::WorkflowState;
use sqlx::PgPool;
use vault_recon_types::Error;
use vault_recon_types::Result;
use vault_recon_types::WorkflowId;

#[derive(Debug, Clone)]
pub struct NewWorkflow {
    pub vault_id: String,
    pub chain_alias: String,
    pub organisation_id: String,
    pub initial_context: WorkflowContext,
}

#[derive(Clone)]
pub struct WorkflowRepo {
    pool: PgPool,
}

impl WorkflowRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: NewWorkflow) -> Result<Workflow> {
        let id = WorkflowId::new();
        let row = sqlx::query_as::<_, WorkflowRow>(
            r#"
            INSERT INTO workflows (
                id, state, context, version, vault_id, chain_alias, organisation_id
            )
            VALUES ($1, $2, $3, 1, $4, $5, $6)
            RETURNING id, state, context, version, vault_id, chain_alias, organisation_id,
                      created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(WorkflowState::Created.as_str())
        .bind(input.initial_context.0)
        .bind(&input.vault_id)
        .bind(&input.chain_alias)
        .bind(&input.organisation_id)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    pub async fn get_by_id(&self, id: WorkflowId) -> Result<Option<Workflow>> {
        let row = sqlx::query_as::<_, WorkflowRow>(
            r#"
            SELECT id, state, context, version, vault_id, chain_alias, organisation_id,
                   created_at, updated_at
            FROM workflows
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    pub async fn get_history(&self, id: WorkflowId) -> Result<Vec<WorkflowEvent>> {
        let rows = sqlx::query_as::<_, WorkflowEventRow>(
            r#"
            SELECT id, workflow_id, event_type, event_payload, from_state, to_state,
                   triggered_by_id, triggered_by_type, created_at
            FROM workflow_events
            WHERE workflow_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Applies one accepted transition: locks the workflow row, performs a
    /// version-conditional update, and appends the event row, all inside one
    /// transaction (§4.1 `send`, §5 "Workflow updates").
    ///
    /// The caller has already computed `(new_state, new_context)` from the
    /// current `(state, context)` via the transition table; this method's
    /// only job is the locked read-modify-write and the optimistic-
    /// concurrency check. Returns [`Error::ConcurrentModification`] if the
    /// conditional update affects zero rows, and [`Error::WorkflowNotFound`]
    /// if the row is gone by the time the lock is taken.
    pub async fn apply_transition(
        &self,
        id: WorkflowId,
        expected_version: i64,
        new_state: WorkflowState,
        new_context: WorkflowContext,
        event_type: &str,
        event_payload: serde_json::Value,
        from_state: WorkflowState,
        triggered_by: &Actor,
    ) -> Result<Workflow> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query("SELECT id FROM workflows WHERE id = $1 FOR UPDATE")
            .bind(id.0)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(Error::WorkflowNotFound(id.0));
        }

        let updated = sqlx::query_as::<_, WorkflowRow>(
            r#"
            UPDATE workflows
            SET state = $1, context = $2, version = version + 1, updated_at = now()
            WHERE id = $3 AND version = $4
            RETURNING id, state, context, version, vault_id, chain_alias, organisation_id,
                      created_at, updated_at
            "#,
        )
        .bind(new_state.as_str())
        .bind(new_context.0)
        .bind(id.0)
        .bind(expected_version)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            return Err(Error::ConcurrentModification { id: id.0 });
        };

        sqlx::query(
            r#"
            INSERT INTO workflow_events (
                id, workflow_id, event_type, event_payload, from_state, to_state,
                triggered_by_id, triggered_by_type
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(id.0)
        .bind(event_type)
        .bind(event_payload)
        .bind(from_state.as_str())
        .bind(updated.state.as_str())
        .bind(&triggered_by.id)
        .bind(triggered_by.kind.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        updated.try_into()
    }
}
