// src/lib.rs
// =============================================================================
// site-mirror: download a website and everything it needs into a local
// directory that can be browsed offline.
//
// Quick start:
//
//   let mut config = MirrorConfig::new("https://example.com/");
//   config.max_depth = 1;
//   let report = Mirror::new(config)?.run().await?;
//
// Modules:
// - config:  run settings and the optional TOML settings file
// - error:   setup errors (returned) and page errors (reported)
// - links:   URL resolution and the link rewriter
// - mirror:  path mapping, registry, limiter, fetcher, crawl tasks
// - report:  what a run saved and what it abandoned
// - logging: tracing subscriber setup for the binary
// =============================================================================

pub mod config;
pub mod error;
pub mod links;
pub mod logging;
pub mod mirror;
pub mod report;

pub use config::{MirrorConfig, SettingsFile, ValidatedConfig};
pub use error::{FetchError, PageError, SetupError};
pub use mirror::{FetchResult, Fetcher, HttpFetcher, Mirror};
pub use report::{AbandonReason, AbandonedPage, MirrorReport, SavedPage};
