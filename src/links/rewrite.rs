// src/links/rewrite.rs
// =============================================================================
// This module walks a parsed HTML page, finds every link we care about,
// queues the same-host targets for download and rewrites the attribute so it
// points at the local copy.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM tree (an ego_tree::Tree of nodes)
// - Lets us walk that tree depth-first and mutate element attributes
// - Serializes the tree back to HTML with .html()
//
// Which attributes count as links:
//   <a href>       navigational, costs one level of depth
//   <img src>      resource, always downloaded
//   <script src>   resource, always downloaded
//   <link href>    resource, always downloaded (stylesheets, icons)
//
// The local path of a target comes from the pure path mapper, never from the
// path table, so rewriting a page never waits for the pages it links to.
//
// Rust concepts:
// - Traits: Enqueue lets the crawler (or a test) decide what "queue" means
// - &mut borrows: the page tree is owned by exactly one task at a time
// =============================================================================

use scraper::{Html, Node};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

use super::resolve::{resolve_reference, HostScope};
use crate::mirror::path::{local_path, relative_href};

/// Navigational link vs. something the page needs to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Anchor,
    Resource,
}

impl LinkKind {
    // The content type we expect the target to have, used to predict its
    // local path before it has been fetched
    fn expected_content_type(self) -> &'static str {
        match self {
            LinkKind::Anchor => "text/html",
            LinkKind::Resource => "",
        }
    }
}

// (element, attribute, kind)
const LINK_ATTRIBUTES: &[(&str, &str, LinkKind)] = &[
    ("a", "href", LinkKind::Anchor),
    ("img", "src", LinkKind::Resource),
    ("script", "src", LinkKind::Resource),
    ("link", "href", LinkKind::Resource),
];

fn link_attribute(tag: &str) -> Option<(&'static str, LinkKind)> {
    LINK_ATTRIBUTES
        .iter()
        .find(|(element, _, _)| tag.eq_ignore_ascii_case(element))
        .map(|(_, attr, kind)| (*attr, *kind))
}

/// Where the page being rewritten lives, and how much depth it has left.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub url: &'a Url,
    /// Relative path the page itself is saved under
    pub path: &'a Path,
    pub scope: &'a HostScope,
    pub depth: usize,
    pub max_depth: usize,
}

/// Receives every same-host target the rewriter wants downloaded.
pub trait Enqueue {
    fn enqueue(&mut self, url: Url, depth: usize);
}

impl Enqueue for Vec<(Url, usize)> {
    fn enqueue(&mut self, url: Url, depth: usize) {
        self.push((url, depth));
    }
}

/// One attribute value the rewriter replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenLink {
    pub target: Url,
    /// The value exactly as the author wrote it
    pub original: String,
    /// The value now in the page
    pub rewritten: String,
    /// Where the mapper expects the target to be saved
    pub predicted: PathBuf,
    pub fragment: Option<String>,
}

// Walks the tree depth-first and rewrites same-host links in place
//
// Foreign and unresolvable links are left byte-identical.
pub fn rewrite_links(
    document: &mut Html,
    page: &PageContext<'_>,
    queue: &mut impl Enqueue,
) -> Vec<RewrittenLink> {
    let mut rewritten = Vec::new();

    // Collect ids first: we can't hold a borrow of the tree while mutating it
    let ids: Vec<_> = document.tree.root().descendants().map(|node| node.id()).collect();

    for id in ids {
        let Some(mut node) = document.tree.get_mut(id) else {
            continue;
        };
        let Node::Element(element) = node.value() else {
            continue;
        };
        let Some((attr, kind)) = link_attribute(element.name()) else {
            continue;
        };

        for (name, value) in element.attrs.iter_mut() {
            if &*name.local != attr {
                continue;
            }

            let original = value.to_string();
            if let Some(link) = rewrite_one(&original, kind, page, queue) {
                *value = link.rewritten.clone().into();
                rewritten.push(link);
            }
        }
    }

    rewritten
}

fn rewrite_one(
    original: &str,
    kind: LinkKind,
    page: &PageContext<'_>,
    queue: &mut impl Enqueue,
) -> Option<RewrittenLink> {
    let resolved = resolve_reference(page.url, original)?;
    if !page.scope.contains(&resolved.url) {
        return None;
    }

    // Past the depth budget an anchor is still pointed at its local copy but
    // not queued. If nothing else saves the target, relinking restores it.
    match kind {
        LinkKind::Anchor if page.depth < page.max_depth => {
            queue.enqueue(resolved.url.clone(), page.depth + 1)
        }
        LinkKind::Anchor => {}
        LinkKind::Resource => queue.enqueue(resolved.url.clone(), page.depth),
    }

    let predicted = local_path(&resolved.url, kind.expected_content_type());
    let rewritten = with_fragment(relative_href(page.path, &predicted), resolved.fragment.as_deref());

    Some(RewrittenLink {
        target: resolved.url,
        original: original.to_string(),
        rewritten,
        predicted,
        fragment: resolved.fragment,
    })
}

/// Appends `#fragment` to an href when there is one.
pub fn with_fragment(mut href: String, fragment: Option<&str>) -> String {
    if let Some(fragment) = fragment {
        href.push('#');
        href.push_str(fragment);
    }
    href
}

/// Parses a page, rewrites its links and serializes it back to HTML.
pub fn rewrite_page(
    markup: &str,
    page: &PageContext<'_>,
    queue: &mut impl Enqueue,
) -> (String, Vec<RewrittenLink>) {
    let mut document = Html::parse_document(markup);
    let links = rewrite_links(&mut document, page, queue);
    (document.html(), links)
}

// Replaces link attribute values found in `fixes` (current value -> new value)
//
// Used after the crawl to repair links whose target never got saved where the
// mapper predicted. Returns how many attributes changed.
pub fn apply_fixes(document: &mut Html, fixes: &HashMap<String, String>) -> usize {
    let mut changed = 0;
    let ids: Vec<_> = document.tree.root().descendants().map(|node| node.id()).collect();

    for id in ids {
        let Some(mut node) = document.tree.get_mut(id) else {
            continue;
        };
        let Node::Element(element) = node.value() else {
            continue;
        };
        let Some((attr, _)) = link_attribute(element.name()) else {
            continue;
        };

        for (name, value) in element.attrs.iter_mut() {
            if &*name.local != attr {
                continue;
            }
            if let Some(replacement) = fixes.get(&value.to_string()) {
                *value = replacement.clone().into();
                changed += 1;
            }
        }
    }

    changed
}

/// Parses already-saved markup, applies `fixes` and serializes it again.
pub fn fix_page(markup: &str, fixes: &HashMap<String, String>) -> (String, usize) {
    let mut document = Html::parse_document(markup);
    let changed = apply_fixes(&mut document, fixes);
    (document.html(), changed)
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why collect node ids before mutating?
//    - descendants() borrows the tree immutably
//    - get_mut() needs a mutable borrow
//    - Rust won't allow both at once, so we snapshot the ids (which are Copy)
//
// 2. Why is the Html never held across an .await?
//    - scraper's tree uses non-thread-safe string buffers, so Html is not Send
//    - A tokio task must be Send, so all tree work stays in these plain
//      (non-async) functions
// -----------------------------------------------------------------------------
