use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

/// Keyed storage for session records.
///
/// Every method is a single atomic step against the underlying map, so a
/// `take` can never hand the same record to two callers and a
/// `compare_and_swap` only succeeds against the value the caller last saw.
#[async_trait]
pub trait SessionStore<V>: Send + Sync
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V>;

    async fn put(&self, key: String, value: V);

    /// Reads and deletes in one step.
    async fn take(&self, key: &str) -> Option<V>;

    async fn remove(&self, key: &str) -> bool;

    /// Replaces the value only if it still equals `expected`.
    async fn compare_and_swap(&self, key: &str, expected: &V, new: V) -> bool;

    /// Drops every entry for which `keep` returns false; returns how many went.
    async fn retain(&self, keep: &(dyn for<'v> Fn(&'v V) -> bool + Send + Sync)) -> usize;
}

/// In-process [`SessionStore`] for single-process deployments.
pub struct MemoryStore<V> {
    entries: Mutex<HashMap<String, V>>,
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> SessionStore<V> for MemoryStore<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        self.entries.lock().await.get(key).cloned()
    }

    async fn put(&self, key: String, value: V) {
        self.entries.lock().await.insert(key, value);
    }

    async fn take(&self, key: &str) -> Option<V> {
        self.entries.lock().await.remove(key)
    }

    async fn remove(&self, key: &str) -> bool {
        self.entries.lock().await.remove(key).is_some()
    }

    async fn compare_and_swap(&self, key: &str, expected: &V, new: V) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(key) {
            Some(current) if current == expected => {
                *current = new;
                true
            }
            _ => false,
        }
    }

    async fn retain(&self, keep: &(dyn for<'v> Fn(&'v V) -> bool + Send + Sync)) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, v| keep(v));
        before - entries.len()
    }
}
