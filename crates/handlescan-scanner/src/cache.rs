//! Session-scoped probe result cache.

use crate::outcome::ProbeOutcome;
use handlescan_core::{PlatformId, Username};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tracing::debug;

/// In-memory cache of completed probe outcomes, keyed by
/// `(target, platform)`.
///
/// The cache lives for the scanner session and is never evicted or
/// persisted; a repeated probe of the same pair is answered without
/// touching the network. Only terminal outcomes are stored.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: RwLock<HashMap<(Username, PlatformId), ProbeOutcome>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached outcome for a `(target, platform)` pair.
    pub fn get(&self, target: &Username, platform_id: &PlatformId) -> Option<ProbeOutcome> {
        let entries = self.entries.read().expect("acquire cache read lock");

        let outcome = entries
            .get(&(target.clone(), platform_id.clone()))
            .cloned();

        if outcome.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(target = %target, platform = %platform_id, "cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }

        outcome
    }

    /// Store a terminal outcome. Non-terminal outcomes are ignored.
    pub fn put(&self, target: &Username, platform_id: &PlatformId, outcome: &ProbeOutcome) {
        if !outcome.status.is_terminal() {
            return;
        }

        let mut entries = self.entries.write().expect("acquire cache write lock");
        entries.insert((target.clone(), platform_id.clone()), outcome.clone());
    }

    /// Number of cached outcomes.
    pub fn len(&self) -> usize {
        self.entries.read().expect("acquire cache read lock").len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lookups answered from the cache since construction.
    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that fell through to the network since construction.
    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Drop every cached outcome and reset the counters.
    pub fn clear(&self) {
        self.entries.write().expect("acquire cache write lock").clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
