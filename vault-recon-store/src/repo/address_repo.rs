use crate::model::Address;
use crate::model::AddressRow;
use sqlx::PgPool;
use vault_recon_types::Result;

#[derive(Clone)]
pub struct AddressRepo {
    pool: PgPool,
}

impl AddressRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds or creates the tracked row for an `(address, chain)` pair.
    /// Grounded on the `ON CONFLICT DO NOTHING` plus follow-up-select shape
    /// used across the pack for idempotent first-seen rows.
    pub async fn find_or_create(&self, address: &str, chain_alias: &str) -> Result<Address> {
        sqlx::query(
            r#"
            INSERT INTO addresses (id, address, chain_alias)
            VALUES ($1, $2, $3)
            ON CONFLICT (address, chain_alias) DO NOTHING
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(address)
        .bind(chain_alias)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, AddressRow>(
            r#"
            SELECT id, address, chain_alias, last_reconciled_block
            FROM addresses
            WHERE address = $1 AND chain_alias = $2
            "#,
        )
        .bind(address)
        .bind(chain_alias)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    pub async fn get(&self, address: &str, chain_alias: &str) -> Result<Option<Address>> {
        let row = sqlx::query_as::<_, AddressRow>(
            r#"
            SELECT id, address, chain_alias, last_reconciled_block
            FROM addresses
            WHERE address = $1 AND chain_alias = $2
            "#,
        )
        .bind(address)
        .bind(chain_alias)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Advances the high-water mark. Monotone: never regresses
    /// `last_reconciled_block`, which would re-open blocks a prior job
    /// already committed (§4.3.7, §8 property 3).
    pub async fn advance_last_reconciled_block(
        &self,
        address: &str,
        chain_alias: &str,
        block: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE addresses
            SET last_reconciled_block = GREATEST(COALESCE(last_reconciled_block, -1), $1)
            WHERE address = $2 AND chain_alias = $3
            "#,
        )
        .bind(block)
        .bind(address)
        .bind(chain_alias)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
