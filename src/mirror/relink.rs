// src/mirror/relink.rs
// =============================================================================
// Repairs links that were rewritten to a local file which never appeared.
//
// During the crawl a page points its links at the path the mapper predicts,
// without waiting for the target. Once every task has finished we know the
// truth from the path table:
// - target saved where predicted   -> nothing to do
// - target saved somewhere else    -> point the link at the real file
//   (e.g. an <a> that turned out to be a PDF without an extension)
// - target never saved (404, ...)  -> put back the value the author wrote
//
// Pages that need fixing are re-read, patched and written atomically again.
// Runs after the join, so no task ever waits on another task.
// =============================================================================

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::charset::PageCharset;
use super::path::relative_href;
use super::registry::Registry;
use super::storage::write_atomic;
use crate::error::PageError;
use crate::links::rewrite::{fix_page, with_fragment, RewrittenLink};

/// The links one saved page rewrote.
#[derive(Debug, Clone)]
pub(crate) struct PageLinks {
    pub path: PathBuf,
    pub charset: PageCharset,
    pub links: Vec<RewrittenLink>,
}

// "/about" and "/about/" are saved to the same file, so their links are
// fixed together. Two jobs on one file would each overwrite the other's fixes.
fn merge_by_path(pages: Vec<PageLinks>) -> Vec<PageLinks> {
    let mut merged: Vec<PageLinks> = Vec::with_capacity(pages.len());
    let mut index: HashMap<PathBuf, usize> = HashMap::new();

    for page in pages {
        match index.get(&page.path) {
            Some(&i) => merged[i].links.extend(page.links),
            None => {
                index.insert(page.path.clone(), merged.len());
                merged.push(page);
            }
        }
    }

    merged
}

// Works out the replacements for one page: current href -> corrected href
//
// Several targets can share a rewritten href ("/about" and "/about/" both
// predict about/index.html). If any of them really was saved there, the href
// is fine as it is.
pub(crate) fn plan_fixes(page: &PageLinks, registry: &Registry) -> HashMap<String, String> {
    let mut groups: HashMap<&str, Vec<&RewrittenLink>> = HashMap::new();
    for link in &page.links {
        groups.entry(link.rewritten.as_str()).or_default().push(link);
    }

    let mut fixes = HashMap::new();
    for (rewritten, links) in groups {
        let actual: Vec<Option<PathBuf>> = links
            .iter()
            .map(|link| registry.lookup_path(link.target.as_str()))
            .collect();

        let correct = links
            .iter()
            .zip(&actual)
            .any(|(link, saved)| saved.as_deref() == Some(link.predicted.as_path()));
        if correct {
            continue;
        }

        let first = links[0];
        let replacement = match &actual[0] {
            Some(saved) => with_fragment(relative_href(&page.path, saved), first.fragment.as_deref()),
            None => first.original.clone(),
        };
        fixes.insert(rewritten.to_string(), replacement);
    }

    fixes
}

/// Fixes every page that needs it. Returns the number of attributes changed.
pub(crate) async fn reconcile(
    pages: Vec<PageLinks>,
    registry: &Registry,
    out_dir: &Path,
    concurrency: usize,
) -> usize {
    let jobs: Vec<_> = merge_by_path(pages)
        .into_iter()
        .filter_map(|page| {
            let fixes = plan_fixes(&page, registry);
            (!fixes.is_empty()).then_some((page, fixes))
        })
        .collect();

    if jobs.is_empty() {
        return 0;
    }
    debug!(pages = jobs.len(), "relinking pages with dangling links");

    stream::iter(jobs)
        .map(|(page, fixes)| async move {
            match relink_page(out_dir, &page, &fixes).await {
                Ok(changed) => changed,
                Err(e) => {
                    warn!(path = %page.path.display(), error = %e, "relink failed");
                    0
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .fold(0, |total, changed| async move { total + changed })
        .await
}

async fn relink_page(
    out_dir: &Path,
    page: &PageLinks,
    fixes: &HashMap<String, String>,
) -> Result<usize, PageError> {
    let bytes = tokio::fs::read(out_dir.join(&page.path)).await?;
    let markup = page.charset.decode_saved(&bytes);
    let (html, changed) = fix_page(&markup, fixes);
    if changed > 0 {
        write_atomic(out_dir, &page.path, &page.charset.encode(&html)).await?;
    }
    Ok(changed)
}
