// src/mirror/task.rs
// =============================================================================
// This module implements the crawl task: the unit of work for one URL.
//
// How one task runs:
// 1. Claim the URL in the registry (a second claimer just returns)
// 2. Take a limiter slot, fetch, give the slot back
// 3. Work out the local path from the content type we actually got
// 4. HTML: decode, parse, rewrite links (discovering children), serialize
//    and encode back into a charset the saved page declares
//    Anything else: keep the bytes as they are
// 5. Spawn a task for every discovered child
// 6. Write the file atomically, then record its path
// 7. Wait for all children and fold their summaries into ours
//
// Because every task waits for the children it spawned, awaiting the root
// task waits for the whole crawl tree: the run is one structured join.
//
// Failure of any step after the claim abandons this URL only. It stays
// claimed (no retry this run) and never gets a path table entry.
// =============================================================================

use futures::future::{join_all, BoxFuture, FutureExt};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;

use super::charset::PageCharset;
use super::fetch::Fetcher;
use super::limiter::Limiter;
use super::path::{is_markup, local_path};
use super::registry::Registry;
use super::relink::PageLinks;
use super::storage::write_atomic;
use crate::error::{FetchError, PageError};
use crate::links::resolve::HostScope;
use crate::links::rewrite::{rewrite_page, Enqueue, PageContext, RewrittenLink};
use crate::report::{AbandonedPage, SavedPage};

/// Shared, read-mostly state for every task of one run.
pub(crate) struct Crawler {
    pub(crate) scope: HostScope,
    pub(crate) out_dir: PathBuf,
    pub(crate) max_depth: usize,
    pub(crate) request_timeout: Duration,
    pub(crate) registry: Registry,
    pub(crate) limiter: Limiter,
    pub(crate) fetcher: Arc<dyn Fetcher>,
}

/// What a task (and everything below it) produced.
#[derive(Debug, Default)]
pub(crate) struct TaskSummary {
    pub saved: Vec<SavedPage>,
    pub abandoned: Vec<AbandonedPage>,
    pub duplicates: usize,
    pub pages: Vec<PageLinks>,
}

impl TaskSummary {
    fn merge(&mut self, child: TaskSummary) {
        self.saved.extend(child.saved);
        self.abandoned.extend(child.abandoned);
        self.duplicates += child.duplicates;
        self.pages.extend(child.pages);
    }
}

// A fetched page, ready to be written
struct Prepared {
    path: PathBuf,
    contents: Vec<u8>,
    charset: PageCharset,
    markup: bool,
    links: Vec<RewrittenLink>,
    children: Vec<(Url, usize)>,
}

// Children discovered on one page. A target linked several times is queued
// once, at the smallest depth it was seen with.
#[derive(Default)]
struct ChildQueue {
    index: HashMap<String, usize>,
    children: Vec<(Url, usize)>,
}

impl Enqueue for ChildQueue {
    fn enqueue(&mut self, url: Url, depth: usize) {
        match self.index.get(url.as_str()) {
            Some(&i) => {
                let queued = &mut self.children[i].1;
                *queued = (*queued).min(depth);
            }
            None => {
                self.index.insert(url.to_string(), self.children.len());
                self.children.push((url, depth));
            }
        }
    }
}

impl Crawler {
    // The future is boxed because a task spawns more tasks of the same type
    pub(crate) fn crawl(self: Arc<Self>, url: Url, depth: usize) -> BoxFuture<'static, TaskSummary> {
        async move {
            let mut summary = TaskSummary::default();

            if !self.registry.claim(url.as_str()) {
                debug!(%url, "already claimed, skipping");
                summary.duplicates = 1;
                return summary;
            }
            debug!(%url, depth, "claimed");

            let prepared = match self.fetch_and_prepare(&url, depth).await {
                Ok(prepared) => prepared,
                Err(e) => {
                    warn!(%url, error = %e, "abandoned");
                    summary.abandoned.push(AbandonedPage::new(&url, &e));
                    return summary;
                }
            };

            let handles: Vec<_> = prepared
                .children
                .iter()
                .map(|(child, child_depth)| {
                    tokio::spawn(Arc::clone(&self).crawl(child.clone(), *child_depth))
                })
                .collect();

            match self.save(&url, &prepared).await {
                Ok(()) => {
                    info!(%url, path = %prepared.path.display(), "saved");
                    summary.saved.push(SavedPage {
                        url: url.to_string(),
                        path: prepared.path.clone(),
                        markup: prepared.markup,
                        links_rewritten: prepared.links.len(),
                    });
                    if !prepared.links.is_empty() {
                        summary.pages.push(PageLinks {
                            path: prepared.path,
                            charset: prepared.charset,
                            links: prepared.links,
                        });
                    }
                }
                Err(e) => {
                    warn!(%url, error = %e, "abandoned");
                    summary.abandoned.push(AbandonedPage::new(&url, &e));
                }
            }

            let results = join_all(handles).await;
            for ((child, _), result) in prepared.children.iter().zip(results) {
                match result {
                    Ok(child_summary) => summary.merge(child_summary),
                    Err(e) => {
                        // Whatever the child saved below itself is lost with
                        // its summary; the files stay on disk
                        warn!(parent = %url, url = %child, error = %e, "crawl task failed");
                        let error = PageError::Internal(e.to_string());
                        summary.abandoned.push(AbandonedPage::new(child, &error));
                    }
                }
            }

            summary
        }
        .boxed()
    }

    async fn fetch_and_prepare(&self, url: &Url, depth: usize) -> Result<Prepared, PageError> {
        let fetched = {
            let _slot = self.limiter.acquire().await?;
            debug!(%url, "fetching");
            match timeout(self.request_timeout, self.fetcher.fetch(url)).await {
                Ok(result) => result?,
                Err(_) => return Err(FetchError::Timeout.into()),
            }
        };

        if !fetched.is_success() {
            return Err(PageError::Status(fetched.status));
        }

        let path = local_path(url, &fetched.content_type);

        if !is_markup(&fetched.content_type) {
            return Ok(Prepared {
                path,
                contents: fetched.body,
                charset: PageCharset::default(),
                markup: false,
                links: Vec::new(),
                children: Vec::new(),
            });
        }

        let charset = PageCharset::detect(&fetched.content_type, &fetched.body);
        let markup = charset.decode_fetched(&fetched.body);
        let page = PageContext {
            url,
            path: &path,
            scope: &self.scope,
            depth,
            max_depth: self.max_depth,
        };
        let mut queue = ChildQueue::default();
        let (html, links) = rewrite_page(&markup, &page, &mut queue);

        Ok(Prepared {
            path,
            contents: charset.encode(&html),
            charset,
            markup: true,
            links,
            children: queue.children,
        })
    }

    async fn save(&self, url: &Url, prepared: &Prepared) -> Result<(), PageError> {
        write_atomic(&self.out_dir, &prepared.path, &prepared.contents).await?;
        self.registry.record_path(url.as_str(), &prepared.path);
        Ok(())
    }
}
