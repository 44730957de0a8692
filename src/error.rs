// src/error.rs
// =============================================================================
// Error types for the mirroring library.
//
// There are two very different kinds of failure in a mirror run:
// - Setup errors: the run cannot start at all (bad root URL, output directory
//   cannot be created). These are returned to the caller.
// - Page errors: one URL could not be fetched or written. These never
//   leave the crawl task; the URL is reported as abandoned and the run goes on.
//
// Rust concepts:
// - thiserror: derive macro that implements std::error::Error and Display
// - #[from]: automatic conversion so the ? operator works across error types
// =============================================================================

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors reported before any work is attempted.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid root URL '{url}': {source}")]
    InvalidRootUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme '{0}' (only http and https can be mirrored)")]
    UnsupportedScheme(String),

    #[error("root URL has no host: {0}")]
    MissingHost(String),

    #[error("concurrency must be a positive integer")]
    InvalidConcurrency,

    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("cannot read settings file {}: {reason}", path.display())]
    ConfigFile { path: PathBuf, reason: String },
}

/// Why a single fetch produced no response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("too many redirects")]
    Redirect,
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("{0}")]
    Other(String),
}

/// Everything that can make a crawl task abandon its URL.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("cannot write file: {0}")]
    Write(#[from] io::Error),

    /// The task itself failed (panicked or was cancelled)
    #[error("internal error: {0}")]
    Internal(String),
}
