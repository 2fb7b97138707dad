use crate::{CacheError, CacheStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct MemoryEntry {
    value: String,
    /// `None` when `now + ttl` doesn't fit in an [`Instant`].
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// Process-local [`CacheStore`].
///
/// Expired entries are evicted lazily when they are read.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<String, MemoryEntry>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        MemoryCacheStore::default()
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.value.clone()));
            }
        }
        // the read guard above must be released before removing
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries.insert(key.to_string(), MemoryEntry { value, expires_at });
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.clear();
        Ok(())
    }
}
