use crate::{CacheError, CacheStore};
use async_trait::async_trait;
use pipe_trait::Pipe;
use serde::{Deserialize, Serialize};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::fs;

/// Content of a single cache file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiskEntry {
    /// Milliseconds since the Unix epoch.
    expires_at: u64,
    value: String,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}

/// Whether `path` was written by [`DiskCacheStore`]: a temporary file, or a
/// `.json` file whose content is a [`DiskEntry`].
async fn is_store_file(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|file_name| file_name.to_str()) else {
        return false;
    };
    if file_name.ends_with(".tmp") {
        return file_name.contains(".json.");
    }
    if !file_name.ends_with(".json") {
        return false;
    }
    match fs::read(path).await {
        Ok(content) => serde_json::from_slice::<DiskEntry>(&content).is_ok(),
        Err(_) => false,
    }
}

/// [`CacheStore`] that keeps one JSON file per key inside a directory.
///
/// Entries survive across processes. Expired files are removed when read.
#[derive(Debug)]
pub struct DiskCacheStore {
    dir: PathBuf,
    tmp_counter: AtomicU64,
}

impl DiskCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DiskCacheStore { dir: dir.into(), tmp_counter: AtomicU64::new(0) }
    }

    /// Directory that holds the cache files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file that stores `key`.
    ///
    /// Scoped names contain a `/`, which is replaced so that every key maps to
    /// a single file directly inside [`DiskCacheStore::dir`].
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let file_name = key.replace(['/', '\\'], "+");
        self.dir.join(format!("{file_name}.json"))
    }

    fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CacheError + '_ {
        move |error| CacheError::Io { path: path.to_path_buf(), error }
    }
}

#[async_trait]
impl CacheStore for DiskCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.entry_path(key);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(CacheError::Io { path, error }),
        };

        let entry: DiskEntry = serde_json::from_str(&text)
            .map_err(|error| CacheError::Deserialize { key: key.to_string(), error })?;

        if now_millis() >= entry.expires_at {
            tracing::debug!(target: "deptree::cache", ?path, "Remove expired entry");
            if let Err(error) = fs::remove_file(&path).await {
                tracing::debug!(target: "deptree::cache", ?path, ?error, "Failed to remove expired entry");
            }
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let ttl_millis = ttl.as_millis().try_into().unwrap_or(u64::MAX);
        let entry = DiskEntry { expires_at: now_millis().saturating_add(ttl_millis), value };
        let content = serde_json::to_vec(&entry)
            .map_err(|error| CacheError::Serialize { key: key.to_string(), error })?;

        fs::create_dir_all(&self.dir).await.map_err(DiskCacheStore::io_error(&self.dir))?;

        // write to a unique file first so that readers never observe a partial entry
        let path = self.entry_path(key);
        let tmp_path = self.tmp_counter.fetch_add(1, Ordering::Relaxed).pipe(|counter| {
            path.with_extension(format!("json.{pid}-{counter}.tmp", pid = std::process::id()))
        });
        fs::write(&tmp_path, content).await.map_err(DiskCacheStore::io_error(&tmp_path))?;
        if let Err(error) = fs::rename(&tmp_path, &path).await {
            if let Err(remove_error) = fs::remove_file(&tmp_path).await {
                tracing::debug!(target: "deptree::cache", ?tmp_path, ?remove_error, "Failed to remove temporary file");
            }
            return Err(CacheError::Io { path, error });
        }
        Ok(())
    }

    /// Remove the entry files and leftover temporary files. Anything else in
    /// [`DiskCacheStore::dir`], other JSON files included, is kept.
    async fn clear(&self) -> Result<(), CacheError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(CacheError::Io { path: self.dir.clone(), error }),
        };

        while let Some(entry) =
            entries.next_entry().await.map_err(DiskCacheStore::io_error(&self.dir))?
        {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(DiskCacheStore::io_error(&path))?;
            if !file_type.is_file() || !is_store_file(&path).await {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(error) if error.kind() == ErrorKind::NotFound => {}
                Err(error) => return Err(CacheError::Io { path, error }),
            }
        }

        Ok(())
    }
}
