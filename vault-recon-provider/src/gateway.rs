use crate::types::AsyncJobHandle;
use crate::types::AsyncJobPage;
use crate::types::AsyncJobRange;
use crate::types::FetchOptions;
use crate::types::TransactionPage;
use async_trait::async_trait;
use vault_recon_types::ProviderError;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Abstract transaction-history provider (§4.4). One implementation per
/// upstream API; the worker is generic over this trait and never sees a
/// concrete provider type.
///
/// `fetch_transactions_page` models the "lazy sequence" of §4.3.4 step 3 one
/// page at a time rather than eagerly returning everything: the worker loops,
/// advancing `options.cursor` to the returned `next_cursor` and enforcing the
/// rate limit between calls, until a page reports `is_last`.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    fn name(&self) -> &str;

    fn supports_async_jobs(&self, chain_alias: &str) -> bool;

    async fn get_current_block_number(&self, chain_alias: &str) -> ProviderResult<Option<i64>>;

    async fn fetch_transactions_page(
        &self,
        address: &str,
        chain_alias: &str,
        options: FetchOptions,
    ) -> ProviderResult<TransactionPage>;

    async fn start_async_job(
        &self,
        chain_alias: &str,
        address: &str,
        range: AsyncJobRange,
    ) -> ProviderResult<AsyncJobHandle>;

    async fn fetch_async_job_results(&self, next_page_url: &str) -> ProviderResult<AsyncJobPage>;
}
