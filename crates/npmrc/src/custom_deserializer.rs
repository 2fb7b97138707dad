use serde::{de, Deserialize, Deserializer};
use std::{env, ffi::OsString, path::PathBuf, str::FromStr};

pub fn default_registry() -> String {
    "https://registry.npmjs.org/".to_string()
}

/// One day, in seconds.
pub fn default_cache_ttl() -> u64 {
    24 * 60 * 60
}

/// If the $DEPTREE_HOME env variable is set, then $DEPTREE_HOME/cache
/// If the $XDG_CACHE_HOME env variable is set, then $XDG_CACHE_HOME/deptree
/// Otherwise ~/.cache/deptree
pub fn default_cache_dir() -> PathBuf {
    cache_dir_from(env::var_os("DEPTREE_HOME"), env::var_os("XDG_CACHE_HOME"), home::home_dir())
}

pub fn cache_dir_from(
    deptree_home: Option<OsString>,
    xdg_cache_home: Option<OsString>,
    home_dir: Option<PathBuf>,
) -> PathBuf {
    let non_empty = |value: Option<OsString>| value.filter(|value| !value.is_empty());

    if let Some(deptree_home) = non_empty(deptree_home) {
        return PathBuf::from(deptree_home).join("cache");
    }

    if let Some(xdg_cache_home) = non_empty(xdg_cache_home) {
        return PathBuf::from(xdg_cache_home).join("deptree");
    }

    match home_dir {
        Some(home_dir) => home_dir.join(".cache").join("deptree"),
        None => env::temp_dir().join("deptree-cache"),
    }
}

pub fn deserialize_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    u64::from_str(s.trim()).map_err(de::Error::custom)
}

pub fn deserialize_registry<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let mut registry = String::deserialize(deserializer)?;
    if !registry.ends_with('/') {
        registry.push('/');
    }
    Ok(registry)
}
