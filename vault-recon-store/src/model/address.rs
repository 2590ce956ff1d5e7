use vault_recon_types::AddressId;

#[derive(Debug, Clone)]
pub struct Address {
    pub id: AddressId,
    pub address: String,
    pub chain_alias: String,
    pub last_reconciled_block: Option<i64>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AddressRow {
    pub(crate) id: uuid::Uuid,
    pub(crate) address: String,
    pub(crate) chain_alias: String,
    pub(crate) last_reconciled_block: Option<i64>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Address {
            id: AddressId(row.id),
            address: row.address,
            chain_alias: row.chain_alias,
            last_reconciled_block: row.last_reconciled_block,
        }
    }
}
