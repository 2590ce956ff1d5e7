use crate::model::Token;
use crate::model::TokenMetadata;
use crate::model::TokenRow;
use sqlx::PgPool;
use vault_recon_types::Result;

const TOKEN_COLUMNS: &str = r#"
    id, chain_alias, address, name, symbol, decimals,
    needs_classification, classification_attempts, classification_error
"#;

#[derive(Clone)]
pub struct TokenRepo {
    pool: PgPool,
}

impl TokenRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, chain_alias: &str, address: &str) -> Result<Option<Token>> {
        let row = sqlx::query_as::<_, TokenRow>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM tokens WHERE chain_alias = $1 AND address = $2"
        ))
        .bind(chain_alias)
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Upserts display metadata without ever touching the classification
    /// columns on an existing row (see [`TokenMetadata`]). A brand new row
    /// starts `needs_classification = true` so the classifier picks it up.
    pub async fn upsert_metadata(&self, input: TokenMetadata) -> Result<Token> {
        let row = sqlx::query_as::<_, TokenRow>(&format!(
            r#"
            INSERT INTO tokens (id, chain_alias, address, name, symbol, decimals)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (chain_alias, address) DO UPDATE SET
                name = EXCLUDED.name,
                symbol = EXCLUDED.symbol,
                decimals = EXCLUDED.decimals
            RETURNING {TOKEN_COLUMNS}
            "#
        ))
        .bind(uuid::Uuid::new_v4())
        .bind(&input.chain_alias)
        .bind(&input.address)
        .bind(&input.name)
        .bind(&input.symbol)
        .bind(input.decimals)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    pub async fn list_needing_classification(&self, limit: i64) -> Result<Vec<Token>> {
        let rows = sqlx::query_as::<_, TokenRow>(&format!(
            r#"
            SELECT {TOKEN_COLUMNS}
            FROM tokens
            WHERE needs_classification = true
            ORDER BY classification_attempts ASC, address ASC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn record_classification_success(
        &self,
        chain_alias: &str,
        address: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE tokens
            SET needs_classification = false, classification_error = NULL
            WHERE chain_alias = $1 AND address = $2
            "#,
        )
        .bind(chain_alias)
        .bind(address)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn record_classification_failure(
        &self,
        chain_alias: &str,
        address: &str,
        error_message: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE tokens
            SET classification_attempts = classification_attempts + 1,
                classification_error = $1
            WHERE chain_alias = $2 AND address = $3
            "#,
        )
        .bind(error_message)
        .bind(chain_alias)
        .bind(address)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
