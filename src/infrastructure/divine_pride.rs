//! Divine-pride.net client for listing pages, the monster API and images

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use crate::application::ports::outbound::MonsterSitePort;
use crate::domain::Mvp;

pub const DIVINE_PRIDE_BASE_URL: &str = "https://www.divine-pride.net";

/// Client for the divine-pride website and API
pub struct DivinePrideClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl DivinePrideClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch one page of the MVP listing (Flag=4 restricts to MVPs)
    pub async fn listing_page(&self, page: u32) -> Result<String, DivinePrideError> {
        let response = self
            .client
            .get(format!("{}/database/monster", self.base_url))
            .query(&[("Flag", "4"), ("Page", &page.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DivinePrideError::Api(format!(
                "listing page {} returned {}",
                page,
                response.status()
            )));
        }

        Ok(response.text().await?)
    }

    /// Fetch one monster's detail record from the API
    pub async fn monster_detail(&self, id: &str) -> Result<Option<Mvp>, DivinePrideError> {
        let response = self
            .client
            .get(format!("{}/api/database/Monster/{}", self.base_url, id))
            .query(&[("apiKey", self.api_key.as_str())])
            .header("Accept-Language", "en-US")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DivinePrideError::Api(format!(
                "monster {} returned {}",
                id,
                response.status()
            )));
        }

        let body = response.text().await?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(trimmed)?))
    }

    /// Download raw image bytes
    pub async fn image_bytes(&self, url: &str) -> Result<Vec<u8>, DivinePrideError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DivinePrideError::Api(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DivinePrideError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
impl MonsterSitePort for DivinePrideClient {
    async fn listing_page(&self, page: u32) -> Result<String> {
        Ok(DivinePrideClient::listing_page(self, page).await?)
    }

    async fn monster_detail(&self, id: &str) -> Result<Option<Mvp>> {
        Ok(DivinePrideClient::monster_detail(self, id).await?)
    }

    async fn image_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(DivinePrideClient::image_bytes(self, url).await?)
    }
}
