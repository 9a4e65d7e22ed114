//! Read-through client for the third-party auction catalog API. No
//! state, no caching; cursors are passed straight through.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_KEY_HEADER: &str = "x-nxopen-api-key";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog API key is not configured")]
    MissingKey,
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog API returned status {0}")]
    Status(u16),
}

/// One listing (or one past trade, from the history endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionItem {
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub item_display_name: Option<String>,
    #[serde(default = "one")]
    pub item_count: u32,
    #[serde(default)]
    pub auction_price_per_unit: u64,
    #[serde(default)]
    pub auction_item_category: String,
    #[serde(default)]
    pub date_auction_expire: Option<String>,
    #[serde(default)]
    pub date_auction_buy: Option<String>,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AuctionPage {
    #[serde(default)]
    pub auction_item: Vec<AuctionItem>,
    #[serde(default)]
    pub auction_history: Vec<AuctionItem>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CatalogClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    async fn call(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<AuctionPage, CatalogError> {
        let key = self.api_key.as_ref().ok_or(CatalogError::MissingKey)?;
        let url = format!("{}{endpoint}", self.base_url);
        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, key)
            .query(params)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }

    /// Current listings, by exact item name or free keyword. Keyword
    /// search uses a dedicated upstream endpoint.
    pub async fn search_items(
        &self,
        item_name: Option<&str>,
        keyword: Option<&str>,
        category: Option<&str>,
        cursor: &str,
    ) -> Result<AuctionPage, CatalogError> {
        let mut params: Vec<(&str, &str)> = vec![("cursor", cursor)];
        let endpoint = if let Some(keyword) = keyword {
            params.push(("keyword", keyword));
            "/mabinogi/v1/auction/keyword-search"
        } else {
            if let Some(name) = item_name {
                params.push(("item_name", name));
            }
            if let Some(category) = category {
                params.push(("auction_item_category", category));
            }
            "/mabinogi/v1/auction/list"
        };
        self.call(endpoint, &params).await
    }

    /// Past trades for an item or category.
    pub async fn search_history(
        &self,
        item_name: Option<&str>,
        category: Option<&str>,
        cursor: &str,
    ) -> Result<AuctionPage, CatalogError> {
        let mut params: Vec<(&str, &str)> = vec![("cursor", cursor)];
        if let Some(name) = item_name {
            params.push(("item_name", name));
        }
        if let Some(category) = category {
            params.push(("auction_item_category", category));
        }
        self.call("/mabinogi/v1/auction/history", &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_is_reported_without_a_request() {
        let client = CatalogClient::new("https://example.invalid".to_string(), None);
        let err = client.search_items(Some("sword"), None, None, "").await;
        assert!(matches!(err, Err(CatalogError::MissingKey)));
    }

    #[test]
    fn page_deserializes_with_missing_fields() {
        let page: AuctionPage =
            serde_json::from_str(r#"{"auction_item":[{"item_name":"sword"}]}"#).unwrap();
        assert_eq!(page.auction_item.len(), 1);
        assert_eq!(page.auction_item[0].item_count, 1);
        assert!(page.next_cursor.is_none());
    }
}
