//! Application configuration

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::services::{AssetCacheConfig, ExtractorConfig, FilterConfig};

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Divine-pride API key; required before any extraction network call
    pub api_key: Option<String>,
    /// Apply field reduction to fetched records
    pub use_filter: bool,
    /// Skip icon downloads
    pub no_icons: bool,
    /// Skip map image downloads
    pub no_map_images: bool,
    /// Drop records whose spawn list ends up empty
    pub ignore_mvp_with_empty_maps: bool,
    /// Stat keys to retain under filtering; `None` keeps all
    pub desired_stats: Option<Vec<String>>,
    /// Root directory for the sink and cached assets
    pub output_path: PathBuf,
    /// Number of listing pages walked during discovery
    pub listing_pages: u32,
    /// Relational store file used by the `load` subcommand
    pub database_path: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let output_path =
            PathBuf::from(env::var("OUTPUT_PATH").unwrap_or_else(|_| "./output".to_string()));

        let database_path = env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| output_path.join("mvps_data.db"));

        Ok(Self {
            api_key: env::var("DIVINE_PRIDE_API_KEY").ok().filter(|k| !k.is_empty()),
            use_filter: env_bool("USE_FILTER"),
            no_icons: env_bool("NO_ICONS"),
            no_map_images: env_bool("NO_MAP_IMAGES"),
            ignore_mvp_with_empty_maps: env_bool("IGNORE_MVP_WITH_EMPTY_MAPS"),
            desired_stats: env::var("DESIRED_STATS").ok().map(|list| {
                list.split(',')
                    .map(|stat| stat.trim().to_string())
                    .filter(|stat| !stat.is_empty())
                    .collect()
            }),
            output_path,
            listing_pages: env::var("LISTING_PAGES")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .context("LISTING_PAGES must be a positive number")?,
            database_path,
        })
    }

    /// Credential check, done pre-flight so a missing key aborts before any
    /// network work.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .context("DIVINE_PRIDE_API_KEY environment variable is required")
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            filter: FilterConfig {
                use_filter: self.use_filter,
                desired_stats: self.desired_stats.clone(),
                ignore_empty_maps: self.ignore_mvp_with_empty_maps,
            },
            assets: AssetCacheConfig {
                fetch_icons: !self.no_icons,
                fetch_map_images: !self.no_map_images,
                output_root: self.output_path.clone(),
            },
            listing_pages: self.listing_pages,
        }
    }
}

fn env_bool(name: &str) -> bool {
    env::var(name)
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "y"
            )
        })
        .unwrap_or(false)
}
