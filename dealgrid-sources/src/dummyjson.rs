use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use dealgrid_core::offer::NewOffer;
use dealgrid_store::app_config::DummyJsonConfig;

use crate::registry::SourceClient;
use crate::SourceError;

const RESULT_LIMIT: usize = 120;

/// DummyJSON product search. No credentials required, which makes it the
/// always-on source for local development.
pub struct DummyJsonClient {
    http: HttpClient,
    config: DummyJsonConfig,
}

#[derive(Debug, Deserialize)]
struct DummyJsonSearchResponse {
    #[serde(default)]
    products: Vec<DummyJsonProduct>,
}

#[derive(Debug, Deserialize)]
struct DummyJsonProduct {
    id: Option<i64>,
    title: Option<String>,
    price: Option<f64>,
    rating: Option<f64>,
    thumbnail: Option<String>,
}

impl DummyJsonClient {
    pub fn new(config: DummyJsonConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self { http, config }
    }

    /// DummyJSON has no per-product page URL in the payload; it is derived
    /// from the product id.
    fn product_url(&self, id: i64) -> String {
        format!("{}/products/{}", self.config.base_url, id)
    }
}

#[async_trait]
impl SourceClient for DummyJsonClient {
    fn name(&self) -> &'static str {
        "dummyjson"
    }

    async fn search(&self, query: &str) -> Result<Vec<NewOffer>, SourceError> {
        let url = format!("{}/products/search", self.config.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?;

        let body: DummyJsonSearchResponse = response.json().await?;
        debug!(
            "DummyJSON returned {} items for '{}'",
            body.products.len(),
            query
        );

        Ok(body
            .products
            .into_iter()
            .take(RESULT_LIMIT)
            .filter_map(|p| self.product_to_offer(p))
            .collect())
    }
}

impl DummyJsonClient {
    fn product_to_offer(&self, product: DummyJsonProduct) -> Option<NewOffer> {
        let id = product.id?;

        Some(NewOffer {
            title: product.title.unwrap_or_default(),
            price: product
                .price
                .and_then(Decimal::from_f64)
                .map(|p| p.round_dp(2))
                .unwrap_or_default(),
            currency: "USD".to_string(), // DummyJSON does not report currency
            url: self.product_url(id),
            source: "dummyjson".to_string(),
            source_offer_id: id.to_string(),
            seller: None,
            image_url: product.thumbnail,
            rating: product
                .rating
                .and_then(Decimal::from_f64)
                .map(|r| r.round_dp(2)),
        })
    }
}
