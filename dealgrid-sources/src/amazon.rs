use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use dealgrid_core::offer::NewOffer;
use dealgrid_store::app_config::AmazonConfig;

use crate::price::{normalize_currency, parse_price};
use crate::registry::SourceClient;
use crate::SourceError;

const RESULT_LIMIT: usize = 120;

/// Amazon product search through the RapidAPI real-time data gateway.
pub struct AmazonClient {
    http: HttpClient,
    config: AmazonConfig,
}

#[derive(Debug, Deserialize)]
struct AmazonSearchResponse {
    #[serde(default)]
    data: Option<AmazonData>,
}

#[derive(Debug, Deserialize)]
struct AmazonData {
    #[serde(default)]
    products: Vec<AmazonProduct>,
}

#[derive(Debug, Deserialize)]
struct AmazonProduct {
    asin: Option<String>,
    product_title: Option<String>,
    /// Display string like "$1,234.56".
    product_price: Option<String>,
    currency: Option<String>,
    product_url: Option<String>,
    product_photo: Option<String>,
    product_star_rating: Option<String>,
}

impl AmazonClient {
    pub fn new(config: AmazonConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self { http, config }
    }
}

#[async_trait]
impl SourceClient for AmazonClient {
    fn name(&self) -> &'static str {
        "amazon"
    }

    async fn search(&self, query: &str) -> Result<Vec<NewOffer>, SourceError> {
        let response = self
            .http
            .get(&self.config.base_url)
            .header("x-rapidapi-key", &self.config.api_key)
            .header("x-rapidapi-host", &self.config.host)
            .query(&[
                ("query", query),
                ("page", "1"),
                ("country", "US"),
                ("sort_by", "RELEVANCE"),
                ("product_condition", "ALL"),
                ("is_prime", "false"),
                ("deals_and_discounts", "NONE"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: AmazonSearchResponse = response.json().await?;
        let products = body.data.map(|d| d.products).unwrap_or_default();
        debug!("Amazon returned {} items for '{}'", products.len(), query);

        Ok(products
            .into_iter()
            .take(RESULT_LIMIT)
            .filter_map(product_to_offer)
            .collect())
    }
}

/// Map a RapidAPI product onto the normalized offer shape. Products without
/// an ASIN are dropped: they cannot be keyed for upserts.
fn product_to_offer(product: AmazonProduct) -> Option<NewOffer> {
    let source_offer_id = product.asin.filter(|asin| !asin.is_empty())?;

    Some(NewOffer {
        title: product.product_title.unwrap_or_default(),
        price: product
            .product_price
            .as_deref()
            .map(parse_price)
            .unwrap_or_default(),
        currency: normalize_currency(product.currency.as_deref()),
        url: product.product_url.unwrap_or_default(),
        source: "amazon".to_string(),
        source_offer_id,
        seller: None,
        image_url: product.product_photo,
        rating: product
            .product_star_rating
            .as_deref()
            .and_then(|r| r.trim().parse::<Decimal>().ok())
            .map(|r| r.round_dp(2)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_product_mapping_from_rapidapi_payload() {
        let payload = serde_json::json!({
            "status": "OK",
            "data": {
                "products": [
                    {
                        "asin": "B0CHWRXH8B",
                        "product_title": "Apple AirPods Pro (2nd Gen)",
                        "product_price": "$189.99",
                        "currency": "USD",
                        "product_url": "https://www.amazon.com/dp/B0CHWRXH8B",
                        "product_photo": "https://m.media-amazon.com/images/I/abc.jpg",
                        "product_star_rating": "4.7"
                    },
                    {
                        "product_title": "Product missing its ASIN",
                        "product_price": "$5.00"
                    }
                ]
            }
        });
        let parsed: AmazonSearchResponse = serde_json::from_value(payload).unwrap();
        let offers: Vec<NewOffer> = parsed
            .data
            .map(|d| d.products)
            .unwrap_or_default()
            .into_iter()
            .filter_map(product_to_offer)
            .collect();

        assert_eq!(offers.len(), 1);
        let offer = &offers[0];
        assert_eq!(offer.source, "amazon");
        assert_eq!(offer.source_offer_id, "B0CHWRXH8B");
        assert_eq!(offer.price, dec!(189.99));
        assert_eq!(offer.rating, Some(dec!(4.7)));
        assert_eq!(offer.seller, None);
    }

    #[test]
    fn test_decorated_price_string_is_cleaned() {
        let product = AmazonProduct {
            asin: Some("B000000001".to_string()),
            product_title: Some("4K Monitor".to_string()),
            product_price: Some("$1,299.00".to_string()),
            currency: None,
            product_url: None,
            product_photo: None,
            product_star_rating: Some("not rated".to_string()),
        };
        let offer = product_to_offer(product).unwrap();
        assert_eq!(offer.price, dec!(1299.00));
        assert_eq!(offer.currency, "USD");
        assert_eq!(offer.rating, None);
    }

    #[test]
    fn test_missing_data_envelope_yields_no_items() {
        let parsed: AmazonSearchResponse =
            serde_json::from_value(serde_json::json!({"status": "OK"})).unwrap();
        assert!(parsed.data.is_none());
    }
}
