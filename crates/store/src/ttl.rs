#![forbid(unsafe_code)]

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tokio::time::Instant;
use tracing::debug;

/// Invalidation epoch observed when a fetch began. An insert carrying a
/// ticket older than the latest invalidation is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

struct Entry<V> {
    value: Arc<V>,
    expires_at: Instant,
    tags: SmallVec<[&'static str; 2]>,
}

struct Inner<K, V> {
    entries: FxHashMap<K, Entry<V>>,
    epoch: u64,
    /// Inserts at or after this instant first drop every expired entry.
    next_sweep: Instant,
}

impl<K, V> Inner<K, V> {
    fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.expires_at > now);
        before - self.entries.len()
    }
}

/// Shared cache with a fixed expiry window and tag-based invalidation.
pub struct TtlCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(ttl: Duration) -> Self {
        let inner = Inner { entries: FxHashMap::default(), epoch: 0, next_sweep: Instant::now() + ttl };
        Self { inner: Mutex::new(inner), ttl }
    }

    /// Take a ticket before starting the fetch whose result will be inserted.
    pub fn ticket(&self) -> Ticket {
        Ticket(self.inner.lock().epoch)
    }

    /// Live value for `key`. Expired entries are evicted on the way.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        match inner.entries.get(key) {
            Some(e) if e.expires_at > now => {
                counter!("ttl_cache_hit_total", 1u64);
                Some(e.value.clone())
            }
            Some(_) => {
                inner.entries.remove(key);
                counter!("ttl_cache_expired_total", 1u64);
                None
            }
            None => {
                counter!("ttl_cache_miss_total", 1u64);
                None
            }
        }
    }

    /// Store `value` under `key` for one window. Returns false, storing
    /// nothing, if an invalidation happened since `ticket` was taken.
    ///
    /// At most once per window an insert also evicts every expired entry,
    /// so keys that are never read again do not pile up.
    pub fn insert(&self, ticket: Ticket, key: K, value: Arc<V>, tags: &[&'static str]) -> bool {
        let mut inner = self.inner.lock();
        if inner.epoch != ticket.0 {
            debug!(ticket = ticket.0, epoch = inner.epoch, "ttl cache: stale insert dropped");
            counter!("ttl_cache_stale_insert_total", 1u64);
            return false;
        }
        let now = Instant::now();
        if now >= inner.next_sweep {
            let swept = inner.sweep(now);
            inner.next_sweep = now + self.ttl;
            counter!("ttl_cache_swept_total", swept as u64);
            debug!(swept, live = inner.entries.len(), "ttl cache: expired entries swept");
        }
        let entry = Entry { value, expires_at: now + self.ttl, tags: tags.iter().copied().collect() };
        inner.entries.insert(key, entry);
        true
    }

    /// Drop every entry carrying `tag`. Safe to repeat; returns how many
    /// entries were removed.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        let mut inner = self.inner.lock();
        inner.epoch = inner.epoch.wrapping_add(1);
        let before = inner.entries.len();
        inner.entries.retain(|_, e| !e.tags.iter().any(|t| *t == tag));
        let removed = before - inner.entries.len();
        debug!(tag, removed, epoch = inner.epoch, "ttl cache: tag invalidated");
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
