use anyhow::Result;
use async_trait::async_trait;

use crate::domain::Mvp;

/// Access to the game-database website and its API.
///
/// Every call hits the network; there is no caching or retrying at this
/// layer. Transport and decode failures surface as errors, a well-formed but
/// empty detail response surfaces as `Ok(None)`.
#[async_trait]
pub trait MonsterSitePort: Send + Sync {
    /// Fetch the raw markup of one monster listing page (1-based).
    async fn listing_page(&self, page: u32) -> Result<String>;

    /// Fetch one monster's full detail record.
    /// Returns `None` when the remote body is empty or null.
    async fn monster_detail(&self, id: &str) -> Result<Option<Mvp>>;

    /// Fetch raw image bytes from the given URL.
    async fn image_bytes(&self, url: &str) -> Result<Vec<u8>>;
}
