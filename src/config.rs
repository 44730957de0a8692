// src/config.rs
// =============================================================================
// Run settings.
//
// - MirrorConfig: what the caller asks for (plain values, easy to build)
// - ValidatedConfig: the same settings after checking them, with the root URL
//   parsed and its host scope worked out
// - SettingsFile: optional TOML file; any field it sets becomes the default
//   that command-line flags can still override
//
// Example settings file:
//
//   output_dir = "./mirror"
//   concurrency = 16
//   max_depth = 3
//   timeout_secs = 30
//   relink_dangling = true
// =============================================================================

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::SetupError;
use crate::links::resolve::{normalize, HostScope};

pub const DEFAULT_OUTPUT_DIR: &str = "./mirror";
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_MAX_DEPTH: usize = 2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub root_url: String,
    pub output_dir: PathBuf,
    /// Maximum simultaneous fetches, must be > 0
    pub concurrency: usize,
    /// 0 = the root page and its resources only
    pub max_depth: usize,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Repair links to targets that were never saved once the crawl is done
    pub relink_dangling: bool,
}

impl MirrorConfig {
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            concurrency: DEFAULT_CONCURRENCY,
            max_depth: DEFAULT_MAX_DEPTH,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
            relink_dangling: true,
        }
    }

    pub fn validate(self) -> Result<ValidatedConfig, SetupError> {
        let parsed = Url::parse(&self.root_url).map_err(|source| SetupError::InvalidRootUrl {
            url: self.root_url.clone(),
            source,
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SetupError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        let scope = HostScope::from_root(&parsed)
            .ok_or_else(|| SetupError::MissingHost(self.root_url.clone()))?;

        if self.concurrency == 0 {
            return Err(SetupError::InvalidConcurrency);
        }

        Ok(ValidatedConfig {
            root: normalize(&parsed),
            scope,
            output_dir: self.output_dir,
            concurrency: self.concurrency,
            max_depth: self.max_depth,
            request_timeout: self.request_timeout,
            user_agent: self.user_agent,
            relink_dangling: self.relink_dangling,
        })
    }
}

/// Checked settings for one run.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    /// Root URL, fragment removed
    pub root: Url,
    pub scope: HostScope,
    pub output_dir: PathBuf,
    pub concurrency: usize,
    pub max_depth: usize,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub relink_dangling: bool,
}

pub fn default_user_agent() -> String {
    format!("site-mirror/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub output_dir: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub max_depth: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub relink_dangling: Option<bool>,
}

impl SettingsFile {
    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let text = std::fs::read_to_string(path).map_err(|e| SetupError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&text).map_err(|reason| SetupError::ConfigFile {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// Copies every value the file sets into `config`.
    pub fn apply_to(&self, config: &mut MirrorConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(n) = self.concurrency {
            config.concurrency = n;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = &self.user_agent {
            config.user_agent = agent.clone();
        }
        if let Some(relink) = self.relink_dangling {
            config.relink_dangling = relink;
        }
    }
}
