//! Shared helpers for the integration tests.

#![allow(dead_code)]

pub mod site_server;
pub mod static_site;

use scraper::{Html, Selector};
use std::path::Path;

/// Values of `attr` on every element matching `selector` in a saved page.
pub fn attr_values(file: &Path, selector: &str, attr: &str) -> Vec<String> {
    // Pages may be saved in a legacy charset; link values are ASCII either way
    let bytes = std::fs::read(file).unwrap_or_else(|e| panic!("read {}: {e}", file.display()));
    let document = Html::parse_document(&String::from_utf8_lossy(&bytes));
    let selector = Selector::parse(selector).unwrap();
    document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr).map(str::to_string))
        .collect()
}

/// Follows a relative href from a saved page to the file it names.
pub fn follow(page: &Path, href: &str) -> std::path::PathBuf {
    let href = href.split('#').next().unwrap_or(href);
    page.parent().unwrap().join(href.replace("%25", "%"))
}
