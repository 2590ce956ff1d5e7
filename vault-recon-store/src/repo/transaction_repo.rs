use crate::model::NewTransaction;
use crate::model::Transaction;
use crate::model::TransactionRow;
use sqlx::PgPool;
use vault_recon_types::Result;

const TX_COLUMNS: &str = r#"
    id, chain_alias, tx_hash, block_number, from_address, to_address, value, fee, status, timestamp
"#;

#[derive(Clone)]
pub struct TransactionRepo {
    pool: PgPool,
}

impl TransactionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_hash(
        &self,
        chain_alias: &str,
        tx_hash: &str,
    ) -> Result<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TX_COLUMNS} FROM transactions WHERE chain_alias = $1 AND tx_hash = $2"
        ))
        .bind(chain_alias)
        .bind(tx_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Inserts a newly-discovered transaction, or updates the stored row in
    /// place when the hash is already known (§4.3.4 step 4's "upsert the
    /// comparable fields" path). Uses `ON CONFLICT` on the `(chain_alias,
    /// tx_hash)` unique index rather than a read-then-write, so two workers
    /// racing on the same hash never both insert.
    pub async fn upsert(&self, input: NewTransaction) -> Result<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            INSERT INTO transactions (
                id, chain_alias, tx_hash, block_number, from_address, to_address,
                value, fee, status, timestamp
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (chain_alias, tx_hash) DO UPDATE SET
                block_number = EXCLUDED.block_number,
                from_address = EXCLUDED.from_address,
                to_address = EXCLUDED.to_address,
                value = EXCLUDED.value,
                fee = EXCLUDED.fee,
                status = EXCLUDED.status,
                timestamp = EXCLUDED.timestamp
            RETURNING {TX_COLUMNS}
            "#
        ))
        .bind(uuid::Uuid::new_v4())
        .bind(&input.chain_alias)
        .bind(&input.tx_hash)
        .bind(input.block_number)
        .bind(&input.from_address)
        .bind(&input.to_address)
        .bind(&input.value)
        .bind(&input.fee)
        .bind(&input.status)
        .bind(input.timestamp)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    /// Soft-deletes by marking a transaction's status (§4.3.4 step 5:
    /// transactions absent from the provider's view within the reconciled
    /// range are never hard-deleted, only flagged).
    pub async fn mark_status(&self, chain_alias: &str, tx_hash: &str, status: &str) -> Result<()> {
        sqlx::query("UPDATE transactions SET status = $1 WHERE chain_alias = $2 AND tx_hash = $3")
            .bind(status)
            .bind(chain_alias)
            .bind(tx_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Lists the locally-known transactions touching `address` within
    /// `[from_block, to_block]`, used by the worker to compute the
    /// soft-delete set (transactions we have that the provider no longer
    /// reports for the same range).
    pub async fn list_in_range(
        &self,
        chain_alias: &str,
        address: &str,
        from_block: i64,
        to_block: i64,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            SELECT {TX_COLUMNS}
            FROM transactions
            WHERE chain_alias = $1
              AND (from_address = $2 OR to_address = $2)
              AND block_number BETWEEN $3 AND $4
            ORDER BY block_number ASC
            "#
        ))
        .bind(chain_alias)
        .bind(address)
        .bind(from_block)
        .bind(to_block)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
