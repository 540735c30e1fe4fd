use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use dealgrid_core::offer::NewOffer;
use dealgrid_store::app_config::EbayConfig;

use crate::price::{normalize_currency, parse_price};
use crate::registry::SourceClient;
use crate::SourceError;

const OAUTH_SCOPE: &str = "https://api.ebay.com/oauth/api_scope";
const RESULT_LIMIT: u32 = 50;

/// Tokens are refreshed this many seconds before their advertised expiry.
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

/// eBay Browse API client using the client-credentials OAuth2 grant.
/// The bearer token is cached and shared across concurrent searches.
pub struct EbayClient {
    http: HttpClient,
    config: EbayConfig,
    token: RwLock<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    item_summaries: Vec<ItemSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemSummary {
    item_id: Option<String>,
    title: Option<String>,
    price: Option<ItemPrice>,
    item_web_url: Option<String>,
    image: Option<ItemImage>,
    seller: Option<ItemSeller>,
}

#[derive(Debug, Deserialize)]
struct ItemPrice {
    value: Option<String>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemImage {
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemSeller {
    username: Option<String>,
    /// Percentage string like "99.6"; converted onto the 0-5 rating scale.
    feedback_percentage: Option<String>,
}

impl EbayClient {
    pub fn new(config: EbayConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            config,
            token: RwLock::new(None),
        }
    }

    /// Return a cached bearer token, refreshing it through the
    /// client-credentials grant when missing or about to expire.
    async fn valid_token(&self) -> Result<String, SourceError> {
        {
            let guard = self.token.read().await;
            if let Some(cached) = guard.as_ref() {
                if Instant::now() < cached.expires_at {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let mut guard = self.token.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(cached) = guard.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
        }

        let response = self
            .http
            .post(&self.config.oauth_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", OAUTH_SCOPE)])
            .send()
            .await
            .map_err(|e| SourceError::Auth(e.to_string()))?
            .error_for_status()
            .map_err(|e| SourceError::Auth(e.to_string()))?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Auth(e.to_string()))?;

        let expires_at = Instant::now()
            + Duration::from_secs(token.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS));
        debug!("Refreshed eBay OAuth token, valid for {}s", token.expires_in);

        let access_token = token.access_token.clone();
        *guard = Some(CachedToken {
            access_token: token.access_token,
            expires_at,
        });
        Ok(access_token)
    }
}

#[async_trait]
impl SourceClient for EbayClient {
    fn name(&self) -> &'static str {
        "ebay"
    }

    async fn search(&self, query: &str) -> Result<Vec<NewOffer>, SourceError> {
        let token = self.valid_token().await?;
        let url = format!("{}/item_summary/search", self.config.api_base_url);
        let limit = RESULT_LIMIT.to_string();

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = response.json().await?;
        debug!(
            "eBay returned {} items for '{}'",
            body.item_summaries.len(),
            query
        );

        Ok(body
            .item_summaries
            .into_iter()
            .filter_map(item_to_offer)
            .collect())
    }
}

/// Map a Browse API item onto the normalized offer shape. Items without an
/// itemId are dropped: they cannot be keyed for upserts.
fn item_to_offer(item: ItemSummary) -> Option<NewOffer> {
    let source_offer_id = item.item_id.filter(|id| !id.is_empty())?;

    Some(NewOffer {
        title: item.title.unwrap_or_default(),
        price: item
            .price
            .as_ref()
            .and_then(|p| p.value.as_deref())
            .map(parse_price)
            .unwrap_or_default(),
        currency: normalize_currency(item.price.as_ref().and_then(|p| p.currency.as_deref())),
        url: item.item_web_url.unwrap_or_default(),
        source: "ebay".to_string(),
        source_offer_id,
        seller: item.seller.as_ref().and_then(|s| s.username.clone()),
        image_url: item.image.and_then(|i| i.image_url),
        rating: item
            .seller
            .as_ref()
            .and_then(|s| s.feedback_percentage.as_deref())
            .and_then(feedback_to_rating),
    })
}

/// eBay reports seller feedback as a 0-100 percentage; offers carry ratings
/// on the marketplace-standard 0-5 scale.
fn feedback_to_rating(feedback: &str) -> Option<Decimal> {
    let pct: Decimal = feedback.trim().parse().ok()?;
    Some((pct / Decimal::from(20)).round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_feedback_percentage_maps_to_five_point_scale() {
        assert_eq!(feedback_to_rating("100"), Some(dec!(5.00)));
        assert_eq!(feedback_to_rating("99.6"), Some(dec!(4.98)));
        assert_eq!(feedback_to_rating("0"), Some(dec!(0)));
        assert_eq!(feedback_to_rating("not-a-number"), None);
    }

    #[test]
    fn test_item_mapping_from_browse_payload() {
        let payload = serde_json::json!({
            "itemSummaries": [
                {
                    "itemId": "v1|110587860964|0",
                    "title": "AirPods Pro 2nd Generation",
                    "price": { "value": "189.99", "currency": "USD" },
                    "itemWebUrl": "https://www.ebay.com/itm/110587860964",
                    "image": { "imageUrl": "https://i.ebayimg.com/images/g/abc/s-l225.jpg" },
                    "seller": { "username": "techdeals", "feedbackPercentage": "99.6" }
                },
                {
                    "title": "Listing without an item id",
                    "price": { "value": "10.00", "currency": "USD" }
                }
            ]
        });
        let parsed: SearchResponse = serde_json::from_value(payload).unwrap();
        let offers: Vec<NewOffer> = parsed
            .item_summaries
            .into_iter()
            .filter_map(item_to_offer)
            .collect();

        assert_eq!(offers.len(), 1);
        let offer = &offers[0];
        assert_eq!(offer.source, "ebay");
        assert_eq!(offer.source_offer_id, "v1|110587860964|0");
        assert_eq!(offer.price, dec!(189.99));
        assert_eq!(offer.currency, "USD");
        assert_eq!(offer.seller.as_deref(), Some("techdeals"));
        assert_eq!(offer.rating, Some(dec!(4.98)));
    }

    #[test]
    fn test_empty_response_parses_to_no_items() {
        let parsed: SearchResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.item_summaries.is_empty());
    }

    #[test]
    fn test_missing_price_defaults_to_zero() {
        let item = ItemSummary {
            item_id: Some("v1|1|0".to_string()),
            title: Some("No price listed".to_string()),
            price: None,
            item_web_url: None,
            image: None,
            seller: None,
        };
        let offer = item_to_offer(item).unwrap();
        assert_eq!(offer.price, Decimal::ZERO);
        assert_eq!(offer.currency, "USD");
        assert_eq!(offer.rating, None);
    }
}
