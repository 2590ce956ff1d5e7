#[derive(Debug, Clone)]
pub struct Token {
    pub id: uuid::Uuid,
    pub chain_alias: String,
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<i32>,
    pub needs_classification: bool,
    pub classification_attempts: i32,
    pub classification_error: Option<String>,
}

/// Metadata upsert input. Deliberately excludes the classification fields:
/// per `spec.md` §3, an upsert of metadata must never touch
/// `needs_classification` / `classification_attempts` / `classification_error`
/// on an existing row — those are owned exclusively by the classifier.
#[derive(Debug, Clone)]
pub struct TokenMetadata {
    pub chain_alias: String,
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<i32>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TokenRow {
    pub(crate) id: uuid::Uuid,
    pub(crate) chain_alias: String,
    pub(crate) address: String,
    pub(crate) name: Option<String>,
    pub(crate) symbol: Option<String>,
    pub(crate) decimals: Option<i32>,
    pub(crate) needs_classification: bool,
    pub(crate) classification_attempts: i32,
    pub(crate) classification_error: Option<String>,
}

impl From<TokenRow> for Token {
    fn from(row: TokenRow) -> Self {
        Token {
            id: row.id,
            chain_alias: row.chain_alias,
            address: row.address,
            name: row.name,
            symbol: row.symbol,
            decimals: row.decimals,
            needs_classification: row.needs_classification,
            classification_attempts: row.classification_attempts,
            classification_error: row.classification_error,
        }
    }
}
