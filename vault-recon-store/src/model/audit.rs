use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use vault_recon_types::JobId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Added,
    Discrepancy,
    SoftDeleted,
    Error,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Added => "added",
            AuditAction::Discrepancy => "discrepancy",
            AuditAction::SoftDeleted => "soft_deleted",
            AuditAction::Error => "error",
        }
    }

    pub fn parse(value: &str) -> vault_recon_types::Result<Self> {
        Ok(match value {
            "added" => Self::Added,
            "discrepancy" => Self::Discrepancy,
            "soft_deleted" => Self::SoftDeleted,
            "error" => Self::Error,
            other => {
                return Err(vault_recon_types::Error::Validation(format!(
                    "unknown audit action: {other}"
                )));
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: uuid::Uuid,
    pub job_id: JobId,
    pub transaction_hash: String,
    pub action: AuditAction,
    pub before_snapshot: Option<Value>,
    pub after_snapshot: Option<Value>,
    pub discrepancy_fields: Vec<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for appending one audit row; constructed by the worker for
/// each classified transaction (added / discrepancy / soft-deleted / error).
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub job_id: JobId,
    pub transaction_hash: String,
    pub action: AuditAction,
    pub before_snapshot: Option<Value>,
    pub after_snapshot: Option<Value>,
    pub discrepancy_fields: Vec<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AuditEntryRow {
    pub(crate) id: uuid::Uuid,
    pub(crate) job_id: uuid::Uuid,
    pub(crate) transaction_hash: String,
    pub(crate) action: String,
    pub(crate) before_snapshot: Option<Value>,
    pub(crate) after_snapshot: Option<Value>,
    pub(crate) discrepancy_fields: Option<Vec<String>>,
    pub(crate) error_message: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

impl TryFrom<AuditEntryRow> for AuditEntry {
    type Error = vault_recon_types::Error;

    fn try_from(row: AuditEntryRow) -> Result<Self, Self::Error> {
        Ok(AuditEntry {
            id: row.id,
            job_id: JobId(row.job_id),
            transaction_hash: row.transaction_hash,
            action: AuditAction::parse(&row.action)?,
            before_snapshot: row.before_snapshot,
            after_snapshot: row.after_snapshot,
            discrepancy_fields: row.discrepancy_fields.unwrap_or_default(),
            error_message: row.error_message,
            created_at: row.created_at,
        })
    }
}
