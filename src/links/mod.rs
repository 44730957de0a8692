// src/links/mod.rs
// =============================================================================
// Everything about the links inside a page.
//
// Submodules:
// - resolve: turn an attribute value into an absolute, fragment-free URL and
//   decide whether it is on the site being mirrored
// - rewrite: walk a parsed page, queue same-host targets, point the
//   attributes at the local copies
// =============================================================================

pub mod resolve;
pub mod rewrite;

pub use resolve::{resolve_reference, HostScope, Resolved};
pub use rewrite::{rewrite_links, rewrite_page, Enqueue, LinkKind, PageContext, RewrittenLink};
