use crate::gateway::ProviderGateway;
use std::collections::HashMap;
use std::sync::Arc;
use vault_recon_types::ChainAlias;

/// Maps a chain to its configured provider. One process-wide instance,
/// built at startup from configuration (§6 "Resolves provider name from
/// chain registry").
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    by_chain: HashMap<String, Arc<dyn ProviderGateway>>,
    default: Option<Arc<dyn ProviderGateway>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, provider: Arc<dyn ProviderGateway>) -> Self {
        self.default = Some(provider);
        self
    }

    pub fn register(mut self, chain_alias: impl Into<String>, provider: Arc<dyn ProviderGateway>) -> Self {
        self.by_chain.insert(chain_alias.into(), provider);
        self
    }

    pub fn resolve(&self, chain_alias: &ChainAlias) -> Option<Arc<dyn ProviderGateway>> {
        self.by_chain
            .get(chain_alias.as_str())
            .cloned()
            .or_else(|| self.default.clone())
    }
}
