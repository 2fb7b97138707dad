mod cache_key;
mod disk_store;
mod error;
mod json;
mod memory_store;

pub use cache_key::cache_key;
pub use disk_store::DiskCacheStore;
pub use error::CacheError;
pub use json::{get_json, set_json};
pub use memory_store::MemoryCacheStore;

use async_trait::async_trait;
use std::time::Duration;

/// Key-value store that keeps JSON text for a limited time.
///
/// An expired entry is indistinguishable from a missing one.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the value stored under `key`, if any and not yet expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` for `ttl`. Overwrites any previous value.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Remove every entry.
    async fn clear(&self) -> Result<(), CacheError>;
}
