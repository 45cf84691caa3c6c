//! Result-set memoization.
//!
//! [`Db`](crate::Db) consults a [`Cache`] before running a SELECT. The key is
//! [`BuiltQuery::cache_key`](crate::qb::BuiltQuery::cache_key), so it already
//! reflects both the SQL text and every bound value.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::row::Row;

/// Memoized row sequences keyed by rendered statement.
///
/// Implementations are expected to populate a key at most once when several
/// callers miss concurrently; the core does not enforce it.
pub trait Cache: Send + Sync {
    /// Look up rows stored under `key`.
    fn get(&self, key: &str) -> Option<Arc<Vec<Row>>>;

    /// Store rows under `key`.
    fn put(&self, key: String, rows: Arc<Vec<Row>>);
}

/// Cache that never stores anything. The default for [`Db`](crate::Db).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl Cache for NoopCache {
    fn get(&self, _key: &str) -> Option<Arc<Vec<Row>>> {
        None
    }

    fn put(&self, _key: String, _rows: Arc<Vec<Row>>) {}
}

impl<C: Cache> Cache for Arc<C> {
    fn get(&self, key: &str) -> Option<Arc<Vec<Row>>> {
        (**self).get(key)
    }

    fn put(&self, key: String, rows: Arc<Vec<Row>>) {
        (**self).put(key, rows)
    }
}

/// Bounded in-process cache with least-recently-used eviction.
///
/// A capacity of 0 stores nothing.
#[derive(Debug)]
pub struct MemoryCache {
    inner: Mutex<MemoryCacheInner>,
}

#[derive(Debug)]
struct MemoryCacheInner {
    capacity: usize,
    map: HashMap<String, Arc<Vec<Row>>>,
    order: VecDeque<String>,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(MemoryCacheInner {
                capacity,
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.map.clear();
        inner.order.clear();
    }

    /// Drop one entry.
    pub fn remove(&self, key: &str) -> Option<Arc<Vec<Row>>> {
        let mut inner = self.lock();
        let removed = inner.map.remove(key);
        if removed.is_some() {
            inner.remove_from_order(key);
        }
        removed
    }

    fn lock(&self) -> MutexGuard<'_, MemoryCacheInner> {
        // entries stay consistent across a panicking holder
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Option<Arc<Vec<Row>>> {
        let mut inner = self.lock();
        let rows = inner.map.get(key).cloned()?;
        inner.touch(key);
        Some(rows)
    }

    fn put(&self, key: String, rows: Arc<Vec<Row>>) {
        let mut inner = self.lock();
        if inner.capacity == 0 {
            return;
        }
        if inner.map.insert(key.clone(), rows).is_some() {
            inner.touch(&key);
        } else {
            inner.order.push_back(key);
        }
        inner.evict_if_needed();
    }
}

impl MemoryCacheInner {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k.as_str() == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn remove_from_order(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k.as_str() == key) {
            let _ = self.order.remove(pos);
        }
    }

    fn evict_if_needed(&mut self) {
        while self.map.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            let _ = self.map.remove(&oldest);
        }
    }
}
