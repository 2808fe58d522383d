//! Idempotent on-disk cache for MVP icons and map images.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::ports::outbound::MonsterSitePort;

const ICON_BASE_URL: &str = "https://static.divine-pride.net/images/mobs/png";
const MAP_BASE_URL: &str = "https://www.divine-pride.net/img/map/original";
const MAP_RAW_BASE_URL: &str = "https://www.divine-pride.net/img/map/raw";

/// Which asset kinds to materialize, and where.
#[derive(Debug, Clone)]
pub struct AssetCacheConfig {
    pub fetch_icons: bool,
    pub fetch_map_images: bool,
    pub output_root: PathBuf,
}

/// Result of one `ensure_asset` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStatus {
    /// Destination already existed; nothing fetched, content not revalidated.
    Cached,
    /// Fetched and written.
    Downloaded,
    /// Fetch or write failed; destination was not created.
    Failed,
}

pub struct AssetCache {
    site: Arc<dyn MonsterSitePort>,
    config: AssetCacheConfig,
}

impl AssetCache {
    pub fn new(site: Arc<dyn MonsterSitePort>, config: AssetCacheConfig) -> Self {
        Self { site, config }
    }

    pub fn config(&self) -> &AssetCacheConfig {
        &self.config
    }

    /// Materialize one asset at `dest` from `url`.
    ///
    /// A pre-existing file short-circuits to `Cached` without touching the
    /// network. An empty response body never creates the destination. Bytes
    /// are written to a `.part` sibling and renamed into place, so a partial
    /// write cannot satisfy the existence check of a later run.
    pub async fn ensure_asset(&self, dest: &Path, url: &str) -> AssetStatus {
        if tokio::fs::try_exists(dest).await.unwrap_or(false) {
            return AssetStatus::Cached;
        }

        let bytes = match self.site.image_bytes(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to download {}: {}", url, e);
                return AssetStatus::Failed;
            }
        };
        if bytes.is_empty() {
            tracing::warn!("Empty response body for {}, not writing {}", url, dest.display());
            return AssetStatus::Failed;
        }

        match self.write_atomic(dest, &bytes).await {
            Ok(()) => AssetStatus::Downloaded,
            Err(e) => {
                tracing::warn!("Failed to write {}: {}", dest.display(), e);
                AssetStatus::Failed
            }
        }
    }

    async fn write_atomic(&self, dest: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut part = dest.as_os_str().to_owned();
        part.push(".part");
        let part = PathBuf::from(part);
        tokio::fs::write(&part, bytes).await?;
        tokio::fs::rename(&part, dest).await
    }

    /// Cache one MVP's icon under `mvps_icons/{id}.png`.
    pub async fn cache_icon(&self, mvp_id: &str) -> AssetStatus {
        let dest = self
            .config
            .output_root
            .join("mvps_icons")
            .join(format!("{mvp_id}.png"));
        let url = format!("{ICON_BASE_URL}/{mvp_id}.png");

        let status = self.ensure_asset(&dest, &url).await;
        match status {
            AssetStatus::Cached => tracing::debug!("[{}] Icon already exists, skipping", mvp_id),
            AssetStatus::Downloaded => {
                tracing::info!("[{}] Completed download of icon {}.png", mvp_id, mvp_id);
            }
            AssetStatus::Failed => {
                tracing::warn!("[{}] Failed to download icon {}.png", mvp_id, mvp_id);
            }
        }
        status
    }

    /// Cache both image variants for one map under `maps/`.
    ///
    /// The display variant lands at `{map}.png`, the raw variant at
    /// `{map}_raw.png`. Failures are independent per variant.
    pub async fn cache_map_images(&self, map_name: &str, mvp_id: &str) -> (AssetStatus, AssetStatus) {
        let maps_dir = self.config.output_root.join("maps");

        let display = self
            .ensure_asset(
                &maps_dir.join(format!("{map_name}.png")),
                &format!("{MAP_BASE_URL}/{map_name}"),
            )
            .await;
        match display {
            AssetStatus::Cached => tracing::debug!("[{}] Map img already exists, skipping", mvp_id),
            AssetStatus::Downloaded => {
                tracing::info!("[{}] Completed download of map {}.png", mvp_id, map_name);
            }
            AssetStatus::Failed => {
                tracing::warn!("[{}] Failed to download map {}.png", mvp_id, map_name);
            }
        }

        let raw = self
            .ensure_asset(
                &maps_dir.join(format!("{map_name}_raw.png")),
                &format!("{MAP_RAW_BASE_URL}/{map_name}"),
            )
            .await;
        match raw {
            AssetStatus::Cached => {
                tracing::debug!("[{}] Raw map img already exists, skipping", mvp_id);
            }
            AssetStatus::Downloaded => {
                tracing::info!("[{}] Completed download of raw map {}_raw.png", mvp_id, map_name);
            }
            AssetStatus::Failed => {
                tracing::warn!("[{}] Failed to download raw map {}_raw.png", mvp_id, map_name);
            }
        }

        (display, raw)
    }
}
