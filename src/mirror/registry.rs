// src/mirror/registry.rs
// =============================================================================
// The one piece of shared mutable state in a mirror run.
//
// Two tables live behind a single mutex:
// - visited: every URL some task has claimed (it is fetched at most once)
// - paths:   URL -> relative path, written only after the file is on disk
//
// Every operation is a single map lookup or insert; nothing that can block
// (network, disk) ever happens while the lock is held.
// =============================================================================

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    visited: HashSet<String>,
    paths: HashMap<String, PathBuf>,
}

/// Visited set and path table for one run.
#[derive(Debug, Default)]
pub struct Registry {
    tables: Mutex<Tables>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic check-and-insert. Only the first caller for a URL gets `true`.
    pub fn claim(&self, url: &str) -> bool {
        self.lock().visited.insert(url.to_string())
    }

    /// Records where a URL was saved. An existing entry is never replaced;
    /// returns false if one was already present.
    pub fn record_path(&self, url: &str, path: &Path) -> bool {
        let mut tables = self.lock();
        if tables.paths.contains_key(url) {
            return false;
        }
        tables.paths.insert(url.to_string(), path.to_path_buf());
        true
    }

    /// Where a URL was saved, if it has been saved yet.
    pub fn lookup_path(&self, url: &str) -> Option<PathBuf> {
        self.lock().paths.get(url).cloned()
    }

    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    pub fn saved_count(&self) -> usize {
        self.lock().paths.len()
    }

    // A panic in another task while holding the lock cannot leave the maps
    // half-updated (each operation is a single insert), so poisoning is ignored
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
