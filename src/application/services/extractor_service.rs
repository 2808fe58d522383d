//! Pipeline orchestrator: discovery, bounded fan-out, sink write.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use futures_util::stream::{self, StreamExt};

use crate::application::ports::outbound::{ConfirmPort, ListingParserPort, MonsterSitePort};
use crate::application::services::asset_cache::{AssetCache, AssetCacheConfig};
use crate::application::services::filter::{FilterConfig, MvpFilter};
use crate::domain::Mvp;

pub const SINK_FILE: &str = "mvps_data.json";

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no mvp ids found")]
    EmptyDiscovery,
    #[error("failed to fetch listing page {page}: {cause}")]
    Listing { page: u32, cause: anyhow::Error },
    #[error("failed to write output: {0}")]
    Sink(#[from] std::io::Error),
    #[error("failed to encode mvps_data.json: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub filter: FilterConfig,
    pub assets: AssetCacheConfig,
    /// Fixed number of listing pages to walk during discovery.
    pub listing_pages: u32,
}

/// What happened to the run as a whole.
#[derive(Debug)]
pub enum ExtractOutcome {
    Completed(ExtractSummary),
    /// The operator declined to overwrite an existing sink. Nothing was
    /// fetched or written.
    Aborted,
}

#[derive(Debug, Default)]
pub struct ExtractSummary {
    pub included: usize,
    pub skipped_no_detail: usize,
    pub skipped_empty_maps: usize,
    pub failed: usize,
    pub sink_path: PathBuf,
}

/// Terminal state of one entity within the run.
enum Processed {
    Included(Box<Mvp>),
    SkippedNoDetail,
    SkippedEmptyMaps,
    Failed,
}

pub struct ExtractorService {
    site: Arc<dyn MonsterSitePort>,
    parser: Arc<dyn ListingParserPort>,
    confirm: Arc<dyn ConfirmPort>,
    filter: MvpFilter,
    assets: AssetCache,
    config: ExtractorConfig,
}

impl ExtractorService {
    pub fn new(
        site: Arc<dyn MonsterSitePort>,
        parser: Arc<dyn ListingParserPort>,
        confirm: Arc<dyn ConfirmPort>,
        config: ExtractorConfig,
    ) -> Self {
        let filter = MvpFilter::new(config.filter.desired_stats.clone());
        let assets = AssetCache::new(site.clone(), config.assets.clone());
        Self {
            site,
            parser,
            confirm,
            filter,
            assets,
            config,
        }
    }

    /// Run the whole extraction: confirm, discover, fan out, write the sink.
    pub async fn run(&self) -> Result<ExtractOutcome, PipelineError> {
        let sink_path = self.config.assets.output_root.join(SINK_FILE);

        // The overwrite decision comes before any network or filesystem work
        // so that declining has zero side effects.
        if tokio::fs::try_exists(&sink_path).await.unwrap_or(false)
            && !self.confirm.confirm_overwrite(&sink_path)
        {
            return Ok(ExtractOutcome::Aborted);
        }

        self.announce();
        self.prepare_directories().await?;

        let ids = self.discover_ids().await?;

        let workers = thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(4);
        tracing::debug!("Processing {} mvps with {} workers", ids.len(), workers);

        // Index-addressed slots keep the output in discovery order no matter
        // which worker finishes first.
        let mut slots: Vec<Option<Processed>> = Vec::new();
        slots.resize_with(ids.len(), || None);

        let mut outcomes = stream::iter(ids.into_iter().enumerate())
            .map(|(idx, id)| async move { (idx, self.process_mvp(&id).await) })
            .buffer_unordered(workers);
        while let Some((idx, processed)) = outcomes.next().await {
            slots[idx] = Some(processed);
        }

        let mut summary = ExtractSummary {
            sink_path: sink_path.clone(),
            ..ExtractSummary::default()
        };
        let mut records: Vec<Mvp> = Vec::new();
        for slot in slots {
            match slot {
                Some(Processed::Included(mvp)) => {
                    summary.included += 1;
                    records.push(*mvp);
                }
                Some(Processed::SkippedNoDetail) => summary.skipped_no_detail += 1,
                Some(Processed::SkippedEmptyMaps) => summary.skipped_empty_maps += 1,
                Some(Processed::Failed) | None => summary.failed += 1,
            }
        }

        let json = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&sink_path, json).await?;
        tracing::info!(
            "Wrote {} mvps to {}",
            summary.included,
            sink_path.display()
        );

        Ok(ExtractOutcome::Completed(summary))
    }

    fn announce(&self) {
        let filter = &self.config.filter;
        let assets = self.assets.config();
        tracing::info!(
            "MVPs will {}be filtered",
            if filter.use_filter { "" } else { "not " }
        );
        tracing::info!(
            "MVP icons will {}be downloaded",
            if assets.fetch_icons { "" } else { "not " }
        );
        tracing::info!(
            "MVP map images will {}be downloaded",
            if assets.fetch_map_images { "" } else { "not " }
        );
    }

    async fn prepare_directories(&self) -> Result<(), PipelineError> {
        let assets = self.assets.config();
        if assets.fetch_icons {
            tokio::fs::create_dir_all(assets.output_root.join("mvps_icons")).await?;
        }
        if assets.fetch_map_images {
            tokio::fs::create_dir_all(assets.output_root.join("maps")).await?;
        }
        if !assets.fetch_icons && !assets.fetch_map_images {
            tokio::fs::create_dir_all(&assets.output_root).await?;
        }
        Ok(())
    }

    /// Walk the configured listing pages and concatenate the identifiers
    /// found on each, preserving page order then in-page order.
    async fn discover_ids(&self) -> Result<Vec<String>, PipelineError> {
        tracing::info!("Fetching mvp ids from divine pride");
        let mut ids = Vec::new();
        for page in 1..=self.config.listing_pages {
            let html = self
                .site
                .listing_page(page)
                .await
                .map_err(|cause| PipelineError::Listing { page, cause })?;
            ids.extend(self.parser.extract_ids(&html));
        }
        if ids.is_empty() {
            return Err(PipelineError::EmptyDiscovery);
        }
        tracing::info!("Found {} mvp ids", ids.len());
        Ok(ids)
    }

    /// Steps 1-6 of the per-entity state machine. Asset failures are logged
    /// inside the cache and never exclude the entity.
    async fn process_mvp(&self, id: &str) -> Processed {
        tracing::info!("[{}] Fetching mvp info", id);
        let detail = match self.site.monster_detail(id).await {
            Ok(Some(mvp)) => mvp,
            Ok(None) => {
                tracing::warn!("[{}] Failed to fetch mvp info, skipping", id);
                return Processed::SkippedNoDetail;
            }
            Err(e) => {
                tracing::error!("[{}] Error fetching mvp info: {}", id, e);
                return Processed::Failed;
            }
        };

        let mvp = if self.config.filter.use_filter {
            tracing::debug!("[{}] Filtering mvp", id);
            self.filter.filter_mvp(detail)
        } else {
            detail
        };

        if self.config.filter.ignore_empty_maps && mvp.maps.is_empty() {
            tracing::info!("[{}] No spawn maps, skipping", id);
            return Processed::SkippedEmptyMaps;
        }

        if self.assets.config().fetch_icons {
            self.assets.cache_icon(id).await;
        }
        if self.assets.config().fetch_map_images {
            for spawn in &mvp.maps {
                self.assets.cache_map_images(&spawn.map_name, id).await;
            }
        }

        Processed::Included(Box::new(mvp))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use serde_json::Map;

    use super::*;
    use crate::domain::SpawnPoint;

    /// Fake site: listing pages hold space-separated ids, details come from a
    /// map, and every monster call can carry an artificial delay.
    struct FakeSite {
        pages: Vec<String>,
        details: HashMap<String, Mvp>,
        delays_ms: HashMap<String, u64>,
        failing_ids: Vec<String>,
        network_calls: AtomicUsize,
    }

    impl FakeSite {
        fn new(pages: Vec<&str>, details: Vec<Mvp>) -> Self {
            Self {
                pages: pages.into_iter().map(str::to_string).collect(),
                details: details
                    .into_iter()
                    .map(|mvp| (mvp.id.to_string(), mvp))
                    .collect(),
                delays_ms: HashMap::new(),
                failing_ids: Vec::new(),
                network_calls: AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, id: &str, ms: u64) -> Self {
            self.delays_ms.insert(id.to_string(), ms);
            self
        }

        fn with_failure(mut self, id: &str) -> Self {
            self.failing_ids.push(id.to_string());
            self
        }
    }

    #[async_trait]
    impl MonsterSitePort for FakeSite {
        async fn listing_page(&self, page: u32) -> Result<String> {
            self.network_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .pages
                .get((page - 1) as usize)
                .cloned()
                .unwrap_or_default())
        }

        async fn monster_detail(&self, id: &str) -> Result<Option<Mvp>> {
            self.network_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(ms) = self.delays_ms.get(id) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            if self.failing_ids.iter().any(|f| f == id) {
                return Err(anyhow!("connection reset"));
            }
            Ok(self.details.get(id).cloned())
        }

        async fn image_bytes(&self, _url: &str) -> Result<Vec<u8>> {
            self.network_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0u8])
        }
    }

    /// Parser stub matching FakeSite's space-separated page format.
    struct SplitParser;

    impl ListingParserPort for SplitParser {
        fn extract_ids(&self, html: &str) -> Vec<String> {
            html.split_whitespace().map(str::to_string).collect()
        }
    }

    struct FixedConfirm(bool);

    impl ConfirmPort for FixedConfirm {
        fn confirm_overwrite(&self, _path: &Path) -> bool {
            self.0
        }
    }

    fn mvp(id: u32, name: &str, maps: Vec<SpawnPoint>) -> Mvp {
        Mvp {
            id,
            name: name.to_string(),
            dbname: None,
            maps,
            stats: Map::new(),
        }
    }

    fn spawn(map: &str, time: u32) -> SpawnPoint {
        SpawnPoint {
            map_name: map.to_string(),
            respawn_time: time,
        }
    }

    fn config(root: &Path, filter: FilterConfig) -> ExtractorConfig {
        ExtractorConfig {
            filter,
            assets: AssetCacheConfig {
                fetch_icons: false,
                fetch_map_images: false,
                output_root: root.to_path_buf(),
            },
            listing_pages: 1,
        }
    }

    fn service(site: Arc<FakeSite>, cfg: ExtractorConfig) -> ExtractorService {
        ExtractorService::new(site, Arc::new(SplitParser), Arc::new(FixedConfirm(true)), cfg)
    }

    fn sink_records(root: &Path) -> Vec<Mvp> {
        let json = std::fs::read_to_string(root.join(SINK_FILE)).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[tokio::test]
    async fn output_preserves_discovery_order_under_latency() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(
            FakeSite::new(
                vec!["1039 1046 1086"],
                vec![
                    mvp(1039, "Baphomet", vec![spawn("prt_maze03", 7200)]),
                    mvp(1046, "Doppelganger", vec![spawn("gef_dun02", 7200)]),
                    mvp(1086, "Golden Thief Bug", vec![spawn("prt_sewb4", 3600)]),
                ],
            )
            // The first id resolves last; order must not change.
            .with_delay("1039", 80)
            .with_delay("1046", 40),
        );

        let svc = service(site, config(dir.path(), FilterConfig::default()));
        let outcome = svc.run().await.unwrap();

        let summary = match outcome {
            ExtractOutcome::Completed(summary) => summary,
            ExtractOutcome::Aborted => panic!("run should not abort"),
        };
        assert_eq!(summary.included, 3);

        let names: Vec<String> = sink_records(dir.path())
            .into_iter()
            .map(|mvp| mvp.name)
            .collect();
        assert_eq!(names, vec!["Baphomet", "Doppelganger", "Golden Thief Bug"]);
    }

    #[tokio::test]
    async fn missing_detail_and_transport_errors_skip_only_that_entity() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(
            FakeSite::new(
                vec!["1039 2000 1046"],
                vec![
                    mvp(1039, "Baphomet", vec![spawn("prt_maze03", 7200)]),
                    mvp(1046, "Doppelganger", vec![spawn("gef_dun02", 7200)]),
                ],
            )
            .with_failure("2000"),
        );

        let svc = service(site, config(dir.path(), FilterConfig::default()));
        let outcome = svc.run().await.unwrap();

        let summary = match outcome {
            ExtractOutcome::Completed(summary) => summary,
            ExtractOutcome::Aborted => panic!("run should not abort"),
        };
        assert_eq!(summary.included, 2);
        assert_eq!(summary.failed, 1);

        let ids: Vec<u32> = sink_records(dir.path()).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1039, 1046]);
    }

    #[tokio::test]
    async fn empty_maps_are_skipped_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(FakeSite::new(
            vec!["1039 1046"],
            vec![
                // Only a non-respawning spawn, which the filter removes.
                mvp(1039, "Baphomet", vec![spawn("gld_dun04", 0)]),
                mvp(1046, "Doppelganger", vec![spawn("gef_dun02", 7200)]),
            ],
        ));

        let filter = FilterConfig {
            use_filter: true,
            desired_stats: None,
            ignore_empty_maps: true,
        };
        let svc = service(site, config(dir.path(), filter));
        let outcome = svc.run().await.unwrap();

        let summary = match outcome {
            ExtractOutcome::Completed(summary) => summary,
            ExtractOutcome::Aborted => panic!("run should not abort"),
        };
        assert_eq!(summary.included, 1);
        assert_eq!(summary.skipped_empty_maps, 1);

        let ids: Vec<u32> = sink_records(dir.path()).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1046]);
    }

    #[tokio::test]
    async fn empty_discovery_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(FakeSite::new(vec![""], vec![]));

        let svc = service(site, config(dir.path(), FilterConfig::default()));
        let err = svc.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyDiscovery));
        assert!(!dir.path().join(SINK_FILE).exists());
    }

    #[tokio::test]
    async fn declining_overwrite_leaves_sink_untouched_with_zero_network_calls() {
        let dir = tempfile::tempdir().unwrap();
        let sink = dir.path().join(SINK_FILE);
        std::fs::write(&sink, b"[{\"id\":1,\"name\":\"old\"}]").unwrap();

        let site = Arc::new(FakeSite::new(
            vec!["1039"],
            vec![mvp(1039, "Baphomet", vec![spawn("prt_maze03", 7200)])],
        ));
        let svc = ExtractorService::new(
            site.clone(),
            Arc::new(SplitParser),
            Arc::new(FixedConfirm(false)),
            config(dir.path(), FilterConfig::default()),
        );

        let outcome = svc.run().await.unwrap();
        assert!(matches!(outcome, ExtractOutcome::Aborted));
        assert_eq!(site.network_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            std::fs::read(&sink).unwrap(),
            b"[{\"id\":1,\"name\":\"old\"}]"
        );
    }

    #[tokio::test]
    async fn duplicate_ids_are_not_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let site = Arc::new(FakeSite::new(
            vec!["1039 1039"],
            vec![mvp(1039, "Baphomet", vec![spawn("prt_maze03", 7200)])],
        ));

        let svc = service(site, config(dir.path(), FilterConfig::default()));
        let outcome = svc.run().await.unwrap();

        let summary = match outcome {
            ExtractOutcome::Completed(summary) => summary,
            ExtractOutcome::Aborted => panic!("run should not abort"),
        };
        assert_eq!(summary.included, 2);
    }
}
