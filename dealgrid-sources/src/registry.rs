use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{info, warn};

use dealgrid_core::offer::NewOffer;
use dealgrid_store::app_config::SourcesConfig;

use crate::amazon::AmazonClient;
use crate::dummyjson::DummyJsonClient;
use crate::ebay::EbayClient;
use crate::SourceError;

/// One marketplace adapter: a stable source name plus a search that returns
/// offers already normalized for ingest.
#[async_trait]
pub trait SourceClient: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str) -> Result<Vec<NewOffer>, SourceError>;
}

/// The set of marketplaces enabled by configuration.
pub struct SourceRegistry {
    clients: Vec<Arc<dyn SourceClient>>,
}

impl SourceRegistry {
    pub fn from_config(config: &SourcesConfig) -> Self {
        let mut clients: Vec<Arc<dyn SourceClient>> = Vec::new();

        if let Some(ebay) = &config.ebay {
            clients.push(Arc::new(EbayClient::new(ebay.clone())));
        }
        if let Some(amazon) = &config.amazon {
            clients.push(Arc::new(AmazonClient::new(amazon.clone())));
        }
        clients.push(Arc::new(DummyJsonClient::new(config.dummyjson.clone())));

        let registry = Self { clients };
        info!(
            "Marketplace sources enabled: {}",
            registry.names().join(", ")
        );
        registry
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.clients.iter().map(|c| c.name()).collect()
    }

    /// Adapter for a stored offer's source, if that source is still enabled.
    pub fn client_for(&self, source: &str) -> Option<Arc<dyn SourceClient>> {
        self.clients.iter().find(|c| c.name() == source).cloned()
    }

    /// Fan a query out to every enabled source concurrently and merge the
    /// results. A source that errors contributes nothing; the search still
    /// succeeds on whatever the remaining sources returned.
    pub async fn search_all(&self, query: &str) -> Vec<NewOffer> {
        let results = join_all(
            self.clients
                .iter()
                .map(|client| async move { (client.name(), client.search(query).await) }),
        )
        .await;

        let mut offers = Vec::new();
        for (name, result) in results {
            match result {
                Ok(mut items) => {
                    info!("{} search successful: {} items", name, items.len());
                    offers.append(&mut items);
                }
                Err(e) => {
                    warn!("{} search failed (skipping): {}", name, e);
                }
            }
        }
        offers
    }

    /// Build a registry from explicit clients, bypassing configuration.
    pub fn with_clients(clients: Vec<Arc<dyn SourceClient>>) -> Self {
        Self { clients }
    }
}
