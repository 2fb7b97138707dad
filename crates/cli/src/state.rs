use deptree_cache::{CacheStore, DiskCacheStore, MemoryCacheStore};
use deptree_network::ThrottledClient;
use deptree_npmrc::{CacheStoreKind, Npmrc};

/// Application state when running `deptree tree`.
pub struct State {
    /// HTTP client to make HTTP requests.
    pub http_client: ThrottledClient,
    /// Configuration read from `.npmrc`
    pub config: &'static Npmrc,
    /// Store shared by package metadata and resolved subtrees.
    pub cache: Box<dyn CacheStore>,
}

impl State {
    /// Initialize the application state.
    pub fn init(config: &'static Npmrc) -> Self {
        State {
            config,
            http_client: ThrottledClient::new_from_cpu_count(),
            cache: create_cache_store(config),
        }
    }
}

/// Instantiate the store selected by `cache-store`.
fn create_cache_store(config: &Npmrc) -> Box<dyn CacheStore> {
    match config.cache_store {
        CacheStoreKind::Disk => Box::new(DiskCacheStore::new(&config.cache_dir)),
        CacheStoreKind::Memory => Box::new(MemoryCacheStore::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn disk_store_writes_into_cache_dir() {
        let dir = tempdir().unwrap();
        let config = Npmrc { cache_dir: dir.path().join("cache"), ..Npmrc::default() };

        let store = create_cache_store(&config);
        store.set("my-package", "{}".to_string(), Duration::from_secs(60)).await.unwrap();

        assert!(dir.path().join("cache/my-package.json").is_file());
        assert_eq!(store.get("my-package").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn memory_store_leaves_cache_dir_untouched() {
        let dir = tempdir().unwrap();
        let config = Npmrc {
            cache_dir: dir.path().join("cache"),
            cache_store: CacheStoreKind::Memory,
            ..Npmrc::default()
        };

        let store = create_cache_store(&config);
        store.set("my-package", "{}".to_string(), Duration::from_secs(60)).await.unwrap();

        assert!(!dir.path().join("cache").exists());
        assert_eq!(store.get("my-package").await.unwrap().as_deref(), Some("{}"));
    }
}
