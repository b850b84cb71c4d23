//! Read-through LRU cache in front of a resolver.

use super::EntityResolver;
use crate::error::Result;
use crate::types::Device;
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

type CacheKey = (String, String);

struct Cached<T> {
    value: T,
    fetched_at: Instant,
}

/// Caches found devices and group sets for a bounded time.
///
/// Not-found results and errors always go back to the inner resolver, so a
/// device registered after a miss is picked up on the next lookup.
pub struct CachedResolver<R> {
    inner: R,
    ttl: Duration,
    devices: Mutex<LruCache<CacheKey, Cached<Device>>>,
    groups: Mutex<LruCache<CacheKey, Cached<BTreeSet<String>>>>,
}

impl<R: EntityResolver> CachedResolver<R> {
    pub fn new(inner: R, capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            ttl,
            devices: Mutex::new(LruCache::new(capacity)),
            groups: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.devices.lock().clear();
        self.groups.lock().clear();
    }

    fn fresh<T: Clone>(&self, cache: &Mutex<LruCache<CacheKey, Cached<T>>>, key: &CacheKey) -> Option<T> {
        let mut cache = cache.lock();
        let entry = cache.get(key)?;
        if entry.fetched_at.elapsed() < self.ttl {
            return Some(entry.value.clone());
        }
        cache.pop(key);
        None
    }
}

fn cache_key(account_id: &str, thing_name: &str) -> CacheKey {
    (account_id.to_string(), thing_name.to_string())
}

impl<R: EntityResolver> EntityResolver for CachedResolver<R> {
    fn resolve_device(&self, account_id: &str, thing_name: &str) -> Result<Option<Device>> {
        let key = cache_key(account_id, thing_name);
        if let Some(device) = self.fresh(&self.devices, &key) {
            return Ok(Some(device));
        }

        let device = self.inner.resolve_device(account_id, thing_name)?;
        if let Some(found) = &device {
            self.devices.lock().put(
                key,
                Cached {
                    value: found.clone(),
                    fetched_at: Instant::now(),
                },
            );
        }
        Ok(device)
    }

    fn resolve_groups(&self, account_id: &str, thing_name: &str) -> Result<BTreeSet<String>> {
        let key = cache_key(account_id, thing_name);
        if let Some(groups) = self.fresh(&self.groups, &key) {
            return Ok(groups);
        }

        let groups = self.inner.resolve_groups(account_id, thing_name)?;
        self.groups.lock().put(
            key,
            Cached {
                value: groups.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(groups)
    }
}
