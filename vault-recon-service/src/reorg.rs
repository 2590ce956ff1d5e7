/// Per-chain reorg thresholds (§4.2 "Reorg threshold"). Approximate, as the
/// spec notes: the point is a safety margin, not an exact confirmation depth.
const DEFAULT_THRESHOLD: i64 = 32;

pub fn threshold_for(chain_alias: &str) -> i64 {
    match chain_alias {
        "bitcoin" | "litecoin" => 6,
        "eth" | "ethereum" | "arbitrum" | "optimism" | "base" => 32,
        "polygon" => 128,
        "solana" => 1,
        "xrp" | "ripple" => 1,
        _ => DEFAULT_THRESHOLD,
    }
}

/// `calculateSafeFromBlock` (§4.2).
pub fn safe_from_block(checkpoint: i64, chain_alias: &str) -> i64 {
    (checkpoint - threshold_for(chain_alias)).max(0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn bitcoin_uses_six_block_threshold() {
        assert_eq!(threshold_for("bitcoin"), 6);
        assert_eq!(safe_from_block(100, "bitcoin"), 94);
    }

    #[test]
    fn unknown_chain_falls_back_to_default_threshold() {
        assert_eq!(threshold_for("some-new-chain"), DEFAULT_THRESHOLD);
    }

    #[test]
    fn safe_from_block_never_goes_negative() {
        assert_eq!(safe_from_block(10, "polygon"), 0);
    }
}
