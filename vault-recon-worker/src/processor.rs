use async_trait::async_trait;
use sqlx::types::BigDecimal;
use std::str::FromStr;
use vault_recon_provider::ProviderTransaction;
use vault_recon_store::NewTransaction;
use vault_recon_store::TokenMetadata;
use vault_recon_store::TokenRepo;
use vault_recon_types::Clock;
use vault_recon_types::Result;

/// Invoked by the worker when a provider-reported transaction is absent
/// locally (§4.5). A real deployment's implementation fetches the raw
/// transaction from an on-chain RPC and classifies it; this contract only
/// fixes the shape so the worker can depend on a trait object.
#[async_trait]
pub trait TransactionProcessor: Send + Sync {
    async fn process(&self, chain_alias: &str, tx: &ProviderTransaction) -> Result<NewTransaction>;
}

/// Heuristic transaction kind derived from a provider's raw payload, in lieu
/// of an on-chain RPC client (none is in scope here — see `DESIGN.md`).
#[derive(Debug, Clone, PartialEq, Eq)]
enum TransactionKind {
    Transfer,
    TokenTransfer { token_address: String },
    ContractCall,
}

fn classify(raw: &serde_json::Value) -> TransactionKind {
    if let Some(transfers) = raw.get("tokenTransfers").and_then(|v| v.as_array()) {
        if let Some(first) = transfers.first() {
            if let Some(token) = first.get("token").and_then(|v| v.as_str()) {
                return TransactionKind::TokenTransfer {
                    token_address: token.to_string(),
                };
            }
        }
    }
    let has_input_data = raw
        .get("inputData")
        .or_else(|| raw.get("data"))
        .and_then(|v| v.as_str())
        .map(|s| !s.is_empty() && s != "0x")
        .unwrap_or(false);
    if has_input_data {
        TransactionKind::ContractCall
    } else {
        TransactionKind::Transfer
    }
}

fn extract_timestamp(raw: &serde_json::Value, clock: &dyn Clock) -> chrono::DateTime<chrono::Utc> {
    raw.get("blockTime")
        .or_else(|| raw.get("timestamp"))
        .and_then(|v| v.as_i64())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(|| clock.now())
}

/// Grounded simplification: derives the normalized transaction row directly
/// from the provider's `normalized` fields and `raw_data`, rather than
/// re-fetching from an RPC node. Still upholds the token classification-field
/// invariant (§3) by routing any detected token through
/// [`TokenRepo::upsert_metadata`], which never touches those columns on an
/// existing row.
pub struct DefaultTransactionProcessor {
    tokens: TokenRepo,
    clock: Box<dyn Clock>,
}

impl DefaultTransactionProcessor {
    pub fn new(tokens: TokenRepo, clock: Box<dyn Clock>) -> Self {
        Self { tokens, clock }
    }
}

#[async_trait]
impl TransactionProcessor for DefaultTransactionProcessor {
    async fn process(&self, chain_alias: &str, tx: &ProviderTransaction) -> Result<NewTransaction> {
        if let TransactionKind::TokenTransfer { token_address } = classify(&tx.raw_data) {
            self.tokens
                .upsert_metadata(TokenMetadata {
                    chain_alias: chain_alias.to_string(),
                    address: token_address,
                    name: None,
                    symbol: None,
                    decimals: None,
                })
                .await?;
        }

        let fee = BigDecimal::from_str(&tx.normalized.fee).map_err(|_| {
            vault_recon_types::Error::Validation(format!(
                "provider returned a non-numeric fee: {}",
                tx.normalized.fee
            ))
        })?;

        Ok(NewTransaction {
            chain_alias: chain_alias.to_string(),
            tx_hash: tx.transaction_hash.clone(),
            block_number: tx.normalized.block_number,
            from_address: tx.normalized.from_address.clone(),
            to_address: tx.normalized.to_address.clone(),
            value: BigDecimal::default(),
            fee,
            status: "confirmed".to_string(),
            timestamp: extract_timestamp(&tx.raw_data, self.clock.as_ref()),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_contract_call_by_input_data() {
        let raw = json!({ "inputData": "0xabcdef" });
        assert_eq!(classify(&raw), TransactionKind::ContractCall);
    }

    #[test]
    fn classifies_plain_transfer_with_empty_input() {
        let raw = json!({ "inputData": "0x" });
        assert_eq!(classify(&raw), TransactionKind::Transfer);
    }

    #[test]
    fn classifies_token_transfer_from_token_transfers_list() {
        let raw = json!({ "tokenTransfers": [{ "token": "0xTOKEN" }] });
        assert_eq!(
            classify(&raw),
            TransactionKind::TokenTransfer {
                token_address: "0xTOKEN".to_string()
            }
        );
    }
}
