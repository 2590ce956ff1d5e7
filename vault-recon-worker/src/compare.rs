use sqlx::types::BigDecimal;
use std::str::FromStr;
use vault_recon_provider::NormalizedFields;
use vault_recon_store::ComparedField;
use vault_recon_store::Transaction;
use vault_recon_types::Ecosystem;
use vault_recon_types::normalize;

/// Compares a locally-stored transaction against the provider's view over
/// `{fromAddress, toAddress, blockNumber, fee}` (§4.3.4 step 4). `value` and
/// `status` are deliberately excluded — see [`vault_recon_store::Transaction`].
pub fn mismatched_fields(
    local: &Transaction,
    provider: &NormalizedFields,
    ecosystem: Ecosystem,
) -> Vec<ComparedField> {
    let mut mismatches = Vec::new();

    if normalize(ecosystem, &local.from_address) != normalize(ecosystem, &provider.from_address) {
        mismatches.push(ComparedField::FromAddress);
    }

    let to_matches = match (&local.to_address, &provider.to_address) {
        (Some(a), Some(b)) => normalize(ecosystem, a) == normalize(ecosystem, b),
        (None, None) => true,
        _ => false,
    };
    if !to_matches {
        mismatches.push(ComparedField::ToAddress);
    }

    if local.block_number != provider.block_number {
        mismatches.push(ComparedField::BlockNumber);
    }

    let fee_matches = BigDecimal::from_str(&provider.fee)
        .map(|provider_fee| provider_fee == local.fee)
        .unwrap_or(false);
    if !fee_matches {
        mismatches.push(ComparedField::Fee);
    }

    mismatches
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use chrono::Utc;

    fn local_tx(fee: &str, block: i64, to: Option<&str>) -> Transaction {
        Transaction {
            id: uuid::Uuid::new_v4(),
            chain_alias: "eth".to_string(),
            tx_hash: "0xhash".to_string(),
            block_number: block,
            from_address: "0xABC".to_string(),
            to_address: to.map(|s| s.to_string()),
            value: BigDecimal::from_str("0").expect("zero"),
            fee: BigDecimal::from_str(fee).expect("fee"),
            status: "confirmed".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn identical_fields_produce_no_mismatch() {
        let local = local_tx("100", 10, Some("0xDEF"));
        let provider = NormalizedFields {
            from_address: "0xabc".to_string(),
            to_address: Some("0xdef".to_string()),
            block_number: 10,
            fee: "100".to_string(),
        };
        assert!(mismatched_fields(&local, &provider, Ecosystem::Evm).is_empty());
    }

    #[test]
    fn differing_fee_is_reported() {
        let local = local_tx("100", 10, Some("0xDEF"));
        let provider = NormalizedFields {
            from_address: "0xabc".to_string(),
            to_address: Some("0xdef".to_string()),
            block_number: 10,
            fee: "200".to_string(),
        };
        assert_eq!(
            mismatched_fields(&local, &provider, Ecosystem::Evm),
            vec![ComparedField::Fee]
        );
    }
}
