use chrono::DateTime;
use chrono::Utc;
use sqlx::types::BigDecimal;

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: uuid::Uuid,
    pub chain_alias: String,
    pub tx_hash: String,
    pub block_number: i64,
    pub from_address: String,
    pub to_address: Option<String>,
    pub value: BigDecimal,
    pub fee: BigDecimal,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Fields compared between a locally-stored transaction and the provider's
/// view of the same hash (§4.3.4 step 4). `value` and `status` are
/// deliberately excluded: provider normalization of those two fields differs
/// enough from ours that including them would flood the audit log with
/// benign mismatches (see `SPEC_FULL.md` / `spec.md` §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum ComparedField {
    FromAddress,
    ToAddress,
    BlockNumber,
    Fee,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TransactionRow {
    pub(crate) id: uuid::Uuid,
    pub(crate) chain_alias: String,
    pub(crate) tx_hash: String,
    pub(crate) block_number: i64,
    pub(crate) from_address: String,
    pub(crate) to_address: Option<String>,
    pub(crate) value: BigDecimal,
    pub(crate) fee: BigDecimal,
    pub(crate) status: String,
    pub(crate) timestamp: DateTime<Utc>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Transaction {
            id: row.id,
            chain_alias: row.chain_alias,
            tx_hash: row.tx_hash,
            block_number: row.block_number,
            from_address: row.from_address,
            to_address: row.to_address,
            value: row.value,
            fee: row.fee,
            status: row.status,
            timestamp: row.timestamp,
        }
    }
}

/// Input to an upsert-on-discovery (§4.5 `TransactionProcessor`).
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub chain_alias: String,
    pub tx_hash: String,
    pub block_number: i64,
    pub from_address: String,
    pub to_address: Option<String>,
    pub value: BigDecimal,
    pub fee: BigDecimal,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
