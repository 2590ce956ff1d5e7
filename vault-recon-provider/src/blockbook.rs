use crate::gateway::ProviderGateway;
use crate::gateway::ProviderResult;
use crate::types::AsyncJobHandle;
use crate::types::AsyncJobPage;
use crate::types::AsyncJobRange;
use crate::types::FetchOptions;
use crate::types::NormalizedFields;
use crate::types::ProviderTransaction;
use crate::types::TransactionPage;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use vault_recon_types::ProviderError;

const DEFAULT_PAGE_SIZE: u32 = 100;

/// Blockbook-style REST provider: address history via `/api/v2/address/{addr}`
/// paginated by page number, no async-job mode. Grounded on the pack's
/// reqwest-backed HTTP clients (`codex-client`'s `ReqwestTransport`) for the
/// request/timeout/error-mapping shape, adapted to a page-number cursor
/// instead of the codex SSE/byte-stream transport.
pub struct BlockbookProvider {
    base_url: String,
    client: reqwest::Client,
}

impl BlockbookProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn page_number(cursor: Option<&str>) -> u32 {
        cursor.and_then(|c| c.parse::<u32>().ok()).unwrap_or(1)
    }
}

#[derive(Debug, Deserialize)]
struct AddressResponse {
    #[serde(rename = "blockHeight")]
    block_height: Option<i64>,
    transactions: Option<Vec<BlockbookTx>>,
    page: Option<u32>,
    #[serde(rename = "totalPages")]
    total_pages: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct BlockbookTx {
    txid: String,
    #[serde(rename = "blockHeight")]
    block_height: i64,
    fees: Option<String>,
    #[serde(rename = "vin")]
    vin: Vec<BlockbookVin>,
    #[serde(rename = "vout")]
    vout: Vec<BlockbookVout>,
}

#[derive(Debug, Clone, Deserialize)]
struct BlockbookVin {
    addresses: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
struct BlockbookVout {
    addresses: Option<Vec<String>>,
}

impl From<BlockbookTx> for ProviderTransaction {
    fn from(tx: BlockbookTx) -> Self {
        let from_address = tx
            .vin
            .first()
            .and_then(|v| v.addresses.as_ref())
            .and_then(|a| a.first())
            .cloned()
            .unwrap_or_default();
        let to_address = tx
            .vout
            .first()
            .and_then(|v| v.addresses.as_ref())
            .and_then(|a| a.first())
            .cloned();
        ProviderTransaction {
            transaction_hash: tx.txid.clone(),
            cursor: tx.txid,
            raw_data: serde_json::json!({}),
            normalized: NormalizedFields {
                from_address,
                to_address,
                block_number: tx.block_height,
                fee: tx.fees.unwrap_or_else(|| "0".to_string()),
            },
        }
    }
}

#[async_trait]
impl ProviderGateway for BlockbookProvider {
    fn name(&self) -> &str {
        "blockbook"
    }

    fn supports_async_jobs(&self, _chain_alias: &str) -> bool {
        false
    }

    async fn get_current_block_number(&self, chain_alias: &str) -> ProviderResult<Option<i64>> {
        let url = format!("{}/api/v2", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| ProviderError::Transient(format!("{chain_alias}: {err}")))?;
        if !response.status().is_success() {
            return Err(ProviderError::Transient(format!(
                "blockbook status {}",
                response.status()
            )));
        }
        #[derive(Deserialize)]
        struct StatusResponse {
            blockbook: BlockbookBlock,
        }
        #[derive(Deserialize)]
        struct BlockbookBlock {
            #[serde(rename = "bestHeight")]
            best_height: Option<i64>,
        }
        let body: StatusResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Transient(err.to_string()))?;
        Ok(body.blockbook.best_height)
    }

    async fn fetch_transactions_page(
        &self,
        address: &str,
        chain_alias: &str,
        options: FetchOptions,
    ) -> ProviderResult<TransactionPage> {
        let page = Self::page_number(options.cursor.as_deref());
        let url = format!("{}/api/v2/address/{address}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("page", page.to_string()),
                ("pageSize", DEFAULT_PAGE_SIZE.to_string()),
                ("details", "txs".to_string()),
            ])
            .send()
            .await
            .map_err(|err| ProviderError::Transient(format!("{chain_alias}: {err}")))?;

        if response.status().is_client_error() {
            return Err(ProviderError::Fatal(format!(
                "blockbook rejected address {address}: {}",
                response.status()
            )));
        }
        if !response.status().is_success() {
            return Err(ProviderError::Transient(format!(
                "blockbook status {}",
                response.status()
            )));
        }

        let body: AddressResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Transient(err.to_string()))?;

        let transactions = body
            .transactions
            .unwrap_or_default()
            .into_iter()
            .map(ProviderTransaction::from)
            .collect();

        let current_page = body.page.unwrap_or(page);
        let total_pages = body.total_pages.unwrap_or(current_page);
        let is_last = current_page >= total_pages;

        Ok(TransactionPage {
            transactions,
            next_cursor: (!is_last).then(|| (current_page + 1).to_string()),
            is_last,
        })
    }

    async fn start_async_job(
        &self,
        chain_alias: &str,
        _address: &str,
        _range: AsyncJobRange,
    ) -> ProviderResult<AsyncJobHandle> {
        Err(ProviderError::Fatal(format!(
            "{chain_alias}: blockbook provider does not support async jobs"
        )))
    }

    async fn fetch_async_job_results(&self, _next_page_url: &str) -> ProviderResult<AsyncJobPage> {
        Err(ProviderError::Fatal(
            "blockbook provider does not support async jobs".to_string(),
        ))
    }
}
