// src/links/resolve.rs
// =============================================================================
// This module turns the raw value of an href/src attribute into an absolute,
// fragment-free URL, and decides whether that URL belongs to the site we are
// mirroring.
//
// How it works:
// 1. Skip references we can never fetch (empty, pure #fragments, data:,
//    mailto:, javascript:, tel:)
// 2. Join the reference against the URL of the page that contains it
// 3. Drop the fragment: "page#a" and "page#b" are the same download
// 4. Compare hostnames (case-insensitive) against the root URL's hostname
//
// Note: scheme and port are NOT part of the same-host test. http://x.test:8080
// and https://x.test both count as "x.test".
// =============================================================================

use url::Url;

/// A reference that resolved to something we could fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Absolute URL with the fragment removed (the dedup key)
    pub url: Url,
    /// The fragment the author wrote, without the leading '#'
    pub fragment: Option<String>,
}

// Resolves a (possibly relative) reference against the page that contains it
//
// Returns None for references that should be left exactly as written.
//
// Examples (page = "https://example.com/docs/intro"):
//   "/about"         -> https://example.com/about
//   "img/logo.png"   -> https://example.com/docs/img/logo.png
//   "../faq#top"     -> https://example.com/faq  (fragment "top")
//   "#top"           -> None
//   "data:image/..." -> None
pub fn resolve_reference(page: &Url, reference: &str) -> Option<Resolved> {
    let reference = reference.trim();

    if reference.is_empty() || reference.starts_with('#') {
        return None;
    }

    let mut url = page.join(reference).ok()?;

    if !is_fetchable(&url) {
        return None;
    }

    let fragment = url.fragment().map(str::to_string);
    url.set_fragment(None);

    Some(Resolved { url, fragment })
}

/// Removes the fragment so the URL can be used as a dedup key.
pub fn normalize(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

// Only http and https can be fetched; data:, mailto:, javascript: and
// friends all parse as valid URLs but there is nothing to download
fn is_fetchable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
}

/// The hostname every mirrored URL must share with the root.
#[derive(Debug, Clone)]
pub struct HostScope {
    host: String,
}

impl HostScope {
    /// Builds the scope from the root URL. Returns None when it has no host.
    pub fn from_root(root: &Url) -> Option<Self> {
        root.host_str().map(|host| Self {
            host: host.to_ascii_lowercase(),
        })
    }

    #[cfg(test)]
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn contains(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| host.eq_ignore_ascii_case(&self.host))
            .unwrap_or(false)
    }
}
