// src/mirror/path.rs
// =============================================================================
// This module maps a URL to the place it is saved on disk.
//
// The mapping is a pure function of (url, content type). That matters: the
// task that saves a page and every other page that links to it compute the
// path independently, and they agree without talking to each other.
//
// Rules, in order:
// 1. The hostname is the top-level directory
// 2. The URL path becomes the sub path
// 3. Empty path, trailing '/', or no extension on a markup page
//    -> append "index.html"
// 4. A query string adds "_<12 hex chars>" to the file name, before the
//    extension, so "img?v=2" and "img?v=3" are different files
//
// Examples:
//   http://x.test/                 -> x.test/index.html
//   http://x.test/about (html)     -> x.test/about/index.html
//   http://x.test/logo.png         -> x.test/logo.png
//   http://x.test/img?v=2 (png)    -> x.test/img_1f0c...
//   http://x.test/page?id=1 (html) -> x.test/page/index_9a3b....html
// =============================================================================

use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};
use url::Url;

/// File name used for directory-like URLs.
pub const INDEX_FILE: &str = "index.html";

/// Number of digest bytes kept for query strings (hex doubles it).
const QUERY_DIGEST_BYTES: usize = 6;

/// Maps a URL to its relative on-disk path under the output directory.
pub fn local_path(url: &Url, content_type: &str) -> PathBuf {
    let host = url
        .host_str()
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "unknown-host".to_string());

    let raw_path = url.path();
    let mut segments: Vec<String> = raw_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(sanitize_segment)
        .collect();

    let directory_like = raw_path.is_empty() || raw_path.ends_with('/') || segments.is_empty();
    let needs_index = directory_like
        || (is_markup(content_type)
            && segments
                .last()
                .map(|name| extension_of(name).is_none())
                .unwrap_or(true));

    if needs_index {
        segments.push(INDEX_FILE.to_string());
    }

    if let Some(query) = url.query() {
        if let Some(name) = segments.last_mut() {
            *name = with_query_digest(name, query);
        }
    }

    let mut path = PathBuf::from(host);
    for segment in segments {
        path.push(segment);
    }
    path
}

/// True when the Content-Type header describes an HTML document.
pub fn is_markup(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    essence == "text/html" || essence == "application/xhtml+xml"
}

// Computes the href that leads from one saved file to another
//
// Both arguments are relative paths under the output directory. The result
// climbs out of the referencing page's directory with "../" and then walks
// down to the target, always with '/' separators.
//
// Examples:
//   from x.test/index.html       to x.test/logo.png        -> "logo.png"
//   from x.test/about/index.html to x.test/logo.png        -> "../logo.png"
//   from x.test/index.html       to x.test/a/b/index.html  -> "a/b/index.html"
pub fn relative_href(from_page: &Path, to_target: &Path) -> String {
    let from_dir: Vec<String> = from_page
        .parent()
        .map(components_of)
        .unwrap_or_default();
    let target = components_of(to_target);

    let common = from_dir
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from_dir.len() {
        parts.push("..".to_string());
    }
    for segment in &target[common..] {
        // On-disk names keep the URL's %XX escapes literally
        parts.push(segment.replace('%', "%25"));
    }

    // "File:Logo.png" would read as a URL with scheme "File"
    if let Some(first) = parts.first_mut() {
        if first != ".." && first.contains(':') {
            first.insert_str(0, "./");
        }
    }

    parts.join("/")
}

fn components_of(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn sanitize_segment(segment: &str) -> String {
    match segment {
        "." | ".." => "_".to_string(),
        other => other.to_string(),
    }
}

fn extension_of(name: &str) -> Option<&str> {
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) if idx + 1 < name.len() => Some(&name[idx + 1..]),
        Some(_) => None,
    }
}

fn with_query_digest(name: &str, query: &str) -> String {
    let digest = Sha256::digest(query.as_bytes());
    let short = hex::encode(&digest[..QUERY_DIGEST_BYTES]);

    match extension_of(name) {
        Some(ext) => {
            let stem = &name[..name.len() - ext.len() - 1];
            format!("{stem}_{short}.{ext}")
        }
        None => format!("{name}_{short}"),
    }
}
