//! Keyed memoization with single-flight miss resolution.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

type CachedValue = Arc<dyn Any + Send + Sync>;

/// Entry stored in the cache.
struct CacheEntry {
    /// Cached value; its concrete type is fixed by the operation tag of the key.
    value: CachedValue,

    /// When this entry was inserted.
    cached_at: Instant,

    /// When this entry stops being served.
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently held, including expired ones not yet swept.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that ran the remote call.
    pub misses: u64,
    /// Configured entry lifetime.
    pub ttl: Duration,
}

/// Memoizing gate over asynchronous remote calls.
///
/// Hits are served under a short read lock and never wait on remote work.
/// Misses are resolved one at a time behind a single gate-wide async mutex:
/// the winner re-checks the cache, runs the call, and stores the result for
/// the configured TTL, so concurrent requests for one key produce exactly one
/// remote call. Misses for unrelated keys are serialized as well.
///
/// Failed calls are never stored. Dropping a `fetch` future releases the
/// mutex and leaves no partial entry.
pub struct MemoizingGate {
    entries: RwLock<HashMap<String, CacheEntry>>,
    miss_lock: Mutex<()>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for MemoizingGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoizingGate")
            .field("entries", &self.entries.read().len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl MemoizingGate {
    /// Create a gate whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            miss_lock: Mutex::new(()),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get the configured entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key`, or run `op` once to produce it.
    ///
    /// Errors from `op` are returned unchanged and nothing is cached.
    pub async fn fetch<T, E, F, Fut>(&self, key: &str, op: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.lookup::<T>(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Cache hit");
            return Ok(value);
        }

        let _guard = self.miss_lock.lock().await;

        if let Some(value) = self.lookup::<T>(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Cache populated while waiting");
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Cache miss, running remote call");

        let value = op().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Peek at a cached value without populating on a miss.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, key: &str) -> Option<T> {
        self.lookup(key)
    }

    /// Check whether a live entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        let entries = self.entries.read();
        entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(Instant::now()))
    }

    /// Remaining lifetime of the entry for `key`.
    pub fn time_to_live(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.expires_at.saturating_duration_since(now))
    }

    /// Age of the entry for `key`, expired or not.
    pub fn age(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.read();
        entries.get(key).map(|entry| entry.cached_at.elapsed())
    }

    /// Drop the entry for `key`. Returns whether one was present.
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.entries.write().remove(key).is_some();
        if removed {
            debug!(key = %key, "Cache entry invalidated");
        }
        removed
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();
        debug!(count, "Cache cleared");
    }

    /// Remove expired entries and return how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of entries held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ttl: self.ttl,
        }
    }

    /// Periodically sweep expired entries.
    ///
    /// The task holds a weak reference and exits once the gate is dropped.
    /// A zero interval starts nothing and returns `None`.
    /// Must be called from within a Tokio runtime.
    pub fn spawn_cleanup_task(self: &Arc<Self>, interval: Duration) -> Option<JoinHandle<()>> {
        if interval.is_zero() {
            warn!("Cleanup interval is zero, expired entries are only dropped when read");
            return None;
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(gate) = weak.upgrade() else {
                    break;
                };
                let removed = gate.purge_expired();
                if removed > 0 {
                    debug!(removed, remaining = gate.len(), "Swept expired cache entries");
                }
            }
        }))
    }

    fn lookup<T: Clone + Send + Sync + 'static>(&self, key: &str) -> Option<T> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        match entry.value.downcast_ref::<T>() {
            Some(value) => Some(value.clone()),
            None => {
                warn!(
                    key = %key,
                    expected = std::any::type_name::<T>(),
                    "Cached value has a different type, treating as a miss"
                );
                None
            }
        }
    }

    fn insert<T: Send + Sync + 'static>(&self, key: &str, value: T) {
        let now = Instant::now();
        let entry = CacheEntry {
            value: Arc::new(value),
            cached_at: now,
            expires_at: now + self.ttl,
        };
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), entry);
        trace!(key = %key, cache_size = entries.len(), "Cache entry stored");
    }
}
