// src/report.rs
// =============================================================================
// The result of a mirror run.
//
// Every crawl task returns what it saved and what it gave up on; the parent
// task folds its children's results into its own, so by the time the root
// task finishes the whole run is summarized here without any extra shared
// state.
//
// #[derive(Serialize)] lets the binary print the report as JSON.
// =============================================================================

use serde::Serialize;
use std::path::PathBuf;
use url::Url;

use crate::error::{FetchError, PageError};

/// A URL whose content is on disk.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SavedPage {
    pub url: String,
    /// Relative to the output directory
    pub path: PathBuf,
    /// True for HTML pages (rewritten), false for raw resources
    pub markup: bool,
    pub links_rewritten: usize,
}

/// Why a URL was given up on
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AbandonReason {
    /// Request timed out
    Timeout,
    /// Connection, DNS, redirect loop or body read failure
    Network,
    /// Server answered with a non-2xx status
    HttpStatus,
    /// File could not be written
    Write,
    /// The crawl task for this URL panicked
    Internal,
}

/// A URL that was claimed but never saved.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AbandonedPage {
    pub url: String,
    pub reason: AbandonReason,
    /// Human-readable detail, e.g. "HTTP 404"
    pub message: String,
}

impl AbandonedPage {
    pub fn new(url: &Url, error: &PageError) -> Self {
        let reason = match error {
            PageError::Fetch(FetchError::Timeout) => AbandonReason::Timeout,
            PageError::Fetch(_) => AbandonReason::Network,
            PageError::Status(_) => AbandonReason::HttpStatus,
            PageError::Write(_) => AbandonReason::Write,
            PageError::Internal(_) => AbandonReason::Internal,
        };
        Self {
            url: url.to_string(),
            reason,
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MirrorReport {
    pub root: String,
    pub output_dir: PathBuf,
    pub saved: Vec<SavedPage>,
    pub abandoned: Vec<AbandonedPage>,
    /// Tasks that found their URL already claimed
    pub duplicates_suppressed: usize,
    /// Links repaired after the crawl because their target was not saved
    /// where predicted
    pub links_relinked: usize,
}

impl MirrorReport {
    pub fn new(
        root: String,
        output_dir: PathBuf,
        mut saved: Vec<SavedPage>,
        mut abandoned: Vec<AbandonedPage>,
        duplicates_suppressed: usize,
        links_relinked: usize,
    ) -> Self {
        // Task completion order is arbitrary; sort for stable output
        saved.sort_by(|a, b| a.url.cmp(&b.url));
        abandoned.sort_by(|a, b| a.url.cmp(&b.url));
        Self {
            root,
            output_dir,
            saved,
            abandoned,
            duplicates_suppressed,
            links_relinked,
        }
    }

    /// True when every claimed URL was saved.
    pub fn is_complete(&self) -> bool {
        self.abandoned.is_empty()
    }

    pub fn saved_path(&self, url: &str) -> Option<&PathBuf> {
        self.saved.iter().find(|page| page.url == url).map(|page| &page.path)
    }

    pub fn pages(&self) -> usize {
        self.saved.iter().filter(|page| page.markup).count()
    }

    pub fn resources(&self) -> usize {
        self.saved.len() - self.pages()
    }
}
