use crate::{CacheError, CacheStore};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Read and decode a JSON value from `store`.
pub async fn get_json<Value>(store: &dyn CacheStore, key: &str) -> Result<Option<Value>, CacheError>
where
    Value: DeserializeOwned,
{
    let Some(text) = store.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|error| CacheError::Deserialize { key: key.to_string(), error })
}

/// Encode `value` as JSON and write it to `store`.
pub async fn set_json<Value>(
    store: &dyn CacheStore,
    key: &str,
    value: &Value,
    ttl: Duration,
) -> Result<(), CacheError>
where
    Value: Serialize + ?Sized,
{
    let text = serde_json::to_string(value)
        .map_err(|error| CacheError::Serialize { key: key.to_string(), error })?;
    store.set(key, text, ttl).await
}
