// src/mirror/mod.rs
// =============================================================================
// This module ties the crawler together and exposes the `Mirror` run.
//
// Submodules:
// - path:     URL -> local file path (pure)
// - charset:  page bytes <-> text in the page's own charset
// - registry: visited set + path table (the only shared mutable state)
// - limiter:  bounds in-flight fetches
// - fetch:    the Fetcher seam and the reqwest implementation
// - storage:  atomic file writes
// - task:     the per-URL crawl task
// - relink:   post-run repair of links to files that never got saved
// =============================================================================

pub mod charset;
pub mod fetch;
pub mod limiter;
pub mod path;
pub mod registry;
pub mod storage;

mod relink;
mod task;

pub use fetch::{FetchResult, Fetcher, HttpFetcher};

use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::{MirrorConfig, ValidatedConfig};
use crate::error::SetupError;
use crate::report::MirrorReport;
use limiter::Limiter;
use registry::Registry;
use task::Crawler;

/// A configured mirror run.
pub struct Mirror {
    config: ValidatedConfig,
    fetcher: Arc<dyn Fetcher>,
}

impl Mirror {
    /// Validates the configuration and builds the HTTP client.
    pub fn new(config: MirrorConfig) -> Result<Self, SetupError> {
        let config = config.validate()?;
        let fetcher = HttpFetcher::new(config.request_timeout, &config.user_agent)?;
        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
        })
    }

    /// Like [`Mirror::new`] but downloads through a caller-supplied fetcher.
    pub fn with_fetcher(config: MirrorConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, SetupError> {
        Ok(Self {
            config: config.validate()?,
            fetcher,
        })
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Mirrors the site and blocks until every discovered task has finished.
    ///
    /// Only setup failures are returned as errors. URLs that could not be
    /// fetched or written show up in `MirrorReport::abandoned`.
    #[instrument(skip(self), fields(root = %self.config.root))]
    pub async fn run(&self) -> Result<MirrorReport, SetupError> {
        let config = &self.config;

        tokio::fs::create_dir_all(&config.output_dir)
            .await
            .map_err(|source| SetupError::OutputDir {
                path: config.output_dir.clone(),
                source,
            })?;

        let crawler = Arc::new(Crawler {
            scope: config.scope.clone(),
            out_dir: config.output_dir.clone(),
            max_depth: config.max_depth,
            request_timeout: config.request_timeout,
            registry: Registry::new(),
            limiter: Limiter::new(config.concurrency),
            fetcher: Arc::clone(&self.fetcher),
        });

        info!(
            concurrency = crawler.limiter.capacity(),
            max_depth = config.max_depth,
            "starting mirror"
        );
        let summary = Arc::clone(&crawler).crawl(config.root.clone(), 0).await;

        let links_relinked = if config.relink_dangling {
            relink::reconcile(summary.pages, &crawler.registry, &config.output_dir, config.concurrency).await
        } else {
            0
        };

        info!(
            visited = crawler.registry.visited_count(),
            saved = crawler.registry.saved_count(),
            "mirror finished"
        );

        Ok(MirrorReport::new(
            config.root.to_string(),
            config.output_dir.clone(),
            summary.saved,
            summary.abandoned,
            summary.duplicates,
            links_relinked,
        ))
    }
}
