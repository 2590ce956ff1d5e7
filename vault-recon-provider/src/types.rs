use serde_json::Value;

/// One transaction as reported by a provider, ahead of any local
/// classification. `raw_data` is kept for the `TransactionProcessor`'s RPC
/// re-fetch path; `normalized` is what the worker diffs against `transactions`
/// rows (§4.3.4 step 4).
#[derive(Debug, Clone)]
pub struct ProviderTransaction {
    pub transaction_hash: String,
    pub cursor: String,
    pub raw_data: Value,
    pub normalized: NormalizedFields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFields {
    pub from_address: String,
    pub to_address: Option<String>,
    pub block_number: i64,
    pub fee: String,
}

/// Parameters narrowing a `fetchTransactions` call (§4.3.4 step 3).
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub cursor: Option<String>,
    pub from_block: Option<i64>,
    pub to_block: Option<i64>,
    pub from_timestamp: Option<chrono::DateTime<chrono::Utc>>,
    pub to_timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

/// One page of the sync-flow "lazy sequence" (§4.3.4 step 3). The worker
/// loops calling `fetch_transactions_page` with `options.cursor` advanced to
/// `next_cursor` until `is_last`, enforcing the rate limit between calls.
#[derive(Debug, Clone)]
pub struct TransactionPage {
    pub transactions: Vec<ProviderTransaction>,
    pub next_cursor: Option<String>,
    pub is_last: bool,
}

/// Range handed to `startAsyncJob` (§4.4).
#[derive(Debug, Clone, Default)]
pub struct AsyncJobRange {
    pub start_block: Option<i64>,
    pub end_block: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AsyncJobHandle {
    pub job_id: String,
    pub next_page_url: String,
}

#[derive(Debug, Clone)]
pub struct AsyncJobPage {
    pub is_ready: bool,
    pub is_complete: bool,
    pub transactions: Vec<ProviderTransaction>,
    pub next_page_url: Option<String>,
}
