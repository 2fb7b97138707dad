use async_trait::async_trait;
use deptree_cache::{CacheError, CacheStore, MemoryCacheStore};
use std::{io, path::PathBuf, sync::Mutex, time::Duration};

/// [`CacheStore`] whose every operation fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCacheStore;

impl FailingCacheStore {
    fn error() -> CacheError {
        CacheError::Io { path: PathBuf::from("failing-cache"), error: io::Error::other("unavailable") }
    }
}

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn get(&self, _: &str) -> Result<Option<String>, CacheError> {
        Err(FailingCacheStore::error())
    }

    async fn set(&self, _: &str, _: String, _: Duration) -> Result<(), CacheError> {
        Err(FailingCacheStore::error())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        Err(FailingCacheStore::error())
    }
}

/// [`MemoryCacheStore`] that remembers the keys it was asked for, in order.
#[derive(Debug, Default)]
pub struct RecordingCacheStore {
    inner: MemoryCacheStore,
    read_keys: Mutex<Vec<String>>,
    written_keys: Mutex<Vec<String>>,
}

impl RecordingCacheStore {
    pub fn new() -> Self {
        RecordingCacheStore::default()
    }

    /// Keys passed to [`CacheStore::get`], hits and misses alike.
    pub fn read_keys(&self) -> Vec<String> {
        self.read_keys.lock().expect("lock read keys").clone()
    }

    /// Keys passed to [`CacheStore::set`].
    pub fn written_keys(&self) -> Vec<String> {
        self.written_keys.lock().expect("lock written keys").clone()
    }
}

#[async_trait]
impl CacheStore for RecordingCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.read_keys.lock().expect("lock read keys").push(key.to_string());
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.written_keys.lock().expect("lock written keys").push(key.to_string());
        self.inner.set(key, value, ttl).await
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.inner.clear().await
    }
}
