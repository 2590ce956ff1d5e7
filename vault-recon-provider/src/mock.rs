use crate::gateway::ProviderGateway;
use crate::gateway::ProviderResult;
use crate::types::AsyncJobHandle;
use crate::types::AsyncJobPage;
use crate::types::AsyncJobRange;
use crate::types::FetchOptions;
use crate::types::ProviderTransaction;
use crate::types::TransactionPage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use vault_recon_types::ProviderError;

/// In-memory provider for tests and local development. Holds a fixed
/// transaction fixture per `(chain_alias, address)` and serves it back
/// page-by-page, honoring `page_size` so pagination and cursor-restart logic
/// can be exercised without a live upstream.
pub struct MockProvider {
    current_block: Mutex<HashMap<String, i64>>,
    fixtures: Mutex<HashMap<(String, String), Vec<ProviderTransaction>>>,
    page_size: usize,
    async_enabled_chains: Vec<String>,
}

impl MockProvider {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_block: Mutex::new(HashMap::new()),
            fixtures: Mutex::new(HashMap::new()),
            page_size,
            async_enabled_chains: Vec::new(),
        }
    }

    pub fn with_async_chain(mut self, chain_alias: impl Into<String>) -> Self {
        self.async_enabled_chains.push(chain_alias.into());
        self
    }

    pub fn set_current_block(&self, chain_alias: &str, block: i64) {
        let mut guard = self
            .current_block
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.insert(chain_alias.to_string(), block);
    }

    pub fn set_transactions(
        &self,
        chain_alias: &str,
        address: &str,
        transactions: Vec<ProviderTransaction>,
    ) {
        let mut guard = self
            .fixtures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.insert((chain_alias.to_string(), address.to_string()), transactions);
    }
}

#[async_trait]
impl ProviderGateway for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn supports_async_jobs(&self, chain_alias: &str) -> bool {
        self.async_enabled_chains.iter().any(|c| c == chain_alias)
    }

    async fn get_current_block_number(&self, chain_alias: &str) -> ProviderResult<Option<i64>> {
        let guard = self
            .current_block
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.get(chain_alias).copied())
    }

    async fn fetch_transactions_page(
        &self,
        address: &str,
        chain_alias: &str,
        options: FetchOptions,
    ) -> ProviderResult<TransactionPage> {
        let guard = self
            .fixtures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let all = guard
            .get(&(chain_alias.to_string(), address.to_string()))
            .cloned()
            .unwrap_or_default();
        drop(guard);

        let start = match &options.cursor {
            Some(cursor) => all
                .iter()
                .position(|tx| tx.cursor == *cursor)
                .map(|idx| idx + 1)
                .unwrap_or(0),
            None => 0,
        };

        let end = (start + self.page_size).min(all.len());
        let transactions = all[start..end].to_vec();
        let is_last = end >= all.len();
        let next_cursor = transactions.last().map(|tx| tx.cursor.clone());

        Ok(TransactionPage {
            transactions,
            next_cursor: if is_last { None } else { next_cursor },
            is_last,
        })
    }

    async fn start_async_job(
        &self,
        chain_alias: &str,
        _address: &str,
        _range: AsyncJobRange,
    ) -> ProviderResult<AsyncJobHandle> {
        if !self.supports_async_jobs(chain_alias) {
            return Err(ProviderError::Fatal(format!(
                "{chain_alias} is not async-enabled on this mock"
            )));
        }
        Ok(AsyncJobHandle {
            job_id: "mock-job-1".to_string(),
            next_page_url: "mock://page/1".to_string(),
        })
    }

    async fn fetch_async_job_results(&self, next_page_url: &str) -> ProviderResult<AsyncJobPage> {
        tracing::trace!(next_page_url, "mock async job page served");
        Ok(AsyncJobPage {
            is_ready: true,
            is_complete: true,
            transactions: Vec::new(),
            next_page_url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::types::NormalizedFields;

    fn tx(hash: &str, block: i64) -> ProviderTransaction {
        ProviderTransaction {
            transaction_hash: hash.to_string(),
            cursor: hash.to_string(),
            raw_data: serde_json::json!({}),
            normalized: NormalizedFields {
                from_address: "0xabc".to_string(),
                to_address: Some("0xdef".to_string()),
                block_number: block,
                fee: "100".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn paginates_and_restarts_from_cursor() {
        let provider = MockProvider::new(2);
        provider.set_transactions(
            "eth",
            "0xabc",
            vec![tx("h1", 1), tx("h2", 2), tx("h3", 3)],
        );

        let first = provider
            .fetch_transactions_page("0xabc", "eth", FetchOptions::default())
            .await
            .expect("first page");
        assert_eq!(first.transactions.len(), 2);
        assert!(!first.is_last);
        assert_eq!(first.next_cursor.as_deref(), Some("h2"));

        let second = provider
            .fetch_transactions_page(
                "0xabc",
                "eth",
                FetchOptions {
                    cursor: first.next_cursor,
                    ..Default::default()
                },
            )
            .await
            .expect("second page");
        assert_eq!(second.transactions.len(), 1);
        assert!(second.is_last);
        assert!(second.next_cursor.is_none());
    }

    #[tokio::test]
    async fn async_jobs_rejected_for_unregistered_chains() {
        let provider = MockProvider::new(10).with_async_chain("eth");
        assert!(provider.supports_async_jobs("eth"));
        assert!(!provider.supports_async_jobs("bitcoin"));

        let err = provider
            .start_async_job("bitcoin", "addr", AsyncJobRange::default())
            .await
            .expect_err("test error");
        assert!(err.is_fatal());
    }
}
