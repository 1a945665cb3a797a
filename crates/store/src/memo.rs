#![forbid(unsafe_code)]

use std::future::Future;
use std::hash::Hash;

use futures::future::{BoxFuture, FutureExt, Shared};
use metrics::counter;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Handle to a memoized computation; clone and await it freely.
pub type SharedResult<V> = Shared<BoxFuture<'static, V>>;

/// Request-scoped single-flight map.
///
/// The first call for a key starts the computation; later calls, whether
/// concurrent or after completion, get the same shared future.
pub struct Memo<K, V: Clone> {
    slots: Mutex<FxHashMap<K, SharedResult<V>>>,
}

impl<K, V> Default for Memo<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self { slots: Mutex::new(FxHashMap::default()) }
    }
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the in-flight or finished computation for `key`, starting it
    /// with `start` if this is the first call. `start` runs at most once per key.
    pub fn get_or_start<F, Fut>(&self, key: K, start: F) -> SharedResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let mut slots = self.slots.lock();
        if let Some(existing) = slots.get(&key) {
            counter!("memo_hit_total", 1u64);
            debug!("memo: joined existing computation");
            return existing.clone();
        }
        counter!("memo_miss_total", 1u64);
        let fut = start().boxed().shared();
        slots.insert(key, fut.clone());
        fut
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn second_call_reuses_first_result() {
        let memo: Memo<&str, u32> = Memo::new();
        let runs = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let r = runs.clone();
            let v = memo
                .get_or_start("k", move || async move {
                    r.fetch_add(1, Ordering::SeqCst);
                    7
                })
                .await;
            assert_eq!(v, 7);
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(memo.len(), 1);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let memo: Memo<u8, u8> = Memo::new();
        let a = memo.get_or_start(1, || async { 10 }).await;
        let b = memo.get_or_start(2, || async { 20 }).await;
        assert_eq!((a, b), (10, 20));
        assert_eq!(memo.len(), 2);
    }
}
