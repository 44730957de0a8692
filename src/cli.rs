// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Options that can also come from a settings file (--config) are Option<T>
// here: None means "not given on the command line", so the file value (or
// the built-in default) is used instead.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

use site_mirror::{MirrorConfig, SettingsFile, SetupError};

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
#[derive(Parser, Debug)]
#[command(
    name = "site-mirror",
    version,
    about = "Mirror a website into a local directory you can browse offline",
    long_about = "site-mirror downloads a page, every same-host image, script and stylesheet it uses, \
                  and the same-host pages it links to (up to --depth levels), then rewrites the links \
                  so the copy works without a network connection."
)]
pub struct Cli {
    /// Root URL to mirror (e.g., https://example.com/)
    pub url: String,

    /// Output directory (created if missing) [default: ./mirror]
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Maximum number of simultaneous downloads [default: 8]
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// How many levels of <a> links to follow
    ///
    /// Depth 0 = just the root page and its images/scripts/stylesheets
    /// Depth 1 = also the pages the root links to
    /// etc. [default: 2]
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Per-request timeout in seconds [default: 15]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Leave links to targets that failed to download pointing at the
    /// (missing) local file instead of restoring the original URL
    #[arg(long)]
    pub keep_dangling: bool,

    /// Print the run report as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,

    /// TOML settings file; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Builds the run configuration: defaults, then the settings file, then flags.
    pub fn to_config(&self) -> Result<MirrorConfig, SetupError> {
        let mut config = MirrorConfig::new(self.url.clone());

        if let Some(path) = &self.config {
            SettingsFile::load(path)?.apply_to(&mut config);
        }

        if let Some(out) = &self.out {
            config.output_dir = out.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(depth) = self.depth {
            config.max_depth = depth;
        }
        if let Some(secs) = self.timeout {
            config.request_timeout = std::time::Duration::from_secs(secs);
        }
        if let Some(agent) = &self.user_agent {
            config.user_agent = agent.clone();
        }
        if self.keep_dangling {
            config.relink_dangling = false;
        }

        Ok(config)
    }
}
