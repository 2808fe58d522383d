mod asset_cache;
mod extractor_service;
mod filter;

pub use asset_cache::{AssetCache, AssetCacheConfig, AssetStatus};
pub use extractor_service::{
    ExtractOutcome, ExtractSummary, ExtractorConfig, ExtractorService, PipelineError, SINK_FILE,
};
pub use filter::{FilterConfig, MvpFilter};
