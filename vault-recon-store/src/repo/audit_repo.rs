use crate::model::AuditEntry;
use crate::model::AuditEntryRow;
use crate::model::NewAuditEntry;
use sqlx::PgPool;
use vault_recon_types::JobId;
use vault_recon_types::Result;

const AUDIT_COLUMNS: &str = r#"
    id, job_id, transaction_hash, action, before_snapshot, after_snapshot,
    discrepancy_fields, error_message, created_at
"#;

#[derive(Clone)]
pub struct AuditRepo {
    pool: PgPool,
}

impl AuditRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, input: NewAuditEntry) -> Result<AuditEntry> {
        let row = sqlx::query_as::<_, AuditEntryRow>(&format!(
            r#"
            INSERT INTO reconciliation_audit_entries (
                id, job_id, transaction_hash, action, before_snapshot, after_snapshot,
                discrepancy_fields, error_message
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {AUDIT_COLUMNS}
            "#
        ))
        .bind(uuid::Uuid::new_v4())
        .bind(input.job_id.0)
        .bind(&input.transaction_hash)
        .bind(input.action.as_str())
        .bind(&input.before_snapshot)
        .bind(&input.after_snapshot)
        .bind(&input.discrepancy_fields)
        .bind(&input.error_message)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    pub async fn list_for_job(&self, job_id: JobId) -> Result<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditEntryRow>(&format!(
            r#"
            SELECT {AUDIT_COLUMNS}
            FROM reconciliation_audit_entries
            WHERE job_id = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(job_id.0)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}
