mod custom_deserializer;

use derive_more::{Display, Error};
use miette::Diagnostic;
use pipe_trait::Pipe;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::custom_deserializer::{
    default_cache_dir, default_cache_ttl, default_registry, deserialize_registry, deserialize_u64,
};

/// Where resolved metadata and subtrees are kept between lookups.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CacheStoreKind {
    /// one JSON file per entry inside `cache-dir`, kept across runs.
    #[default]
    Disk,

    /// process-local map, discarded on exit.
    Memory,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Npmrc {
    /// The base URL of the npm package registry (trailing slash included).
    #[serde(deserialize_with = "deserialize_registry")]
    pub registry: String,

    /// The directory of the disk cache. A relative path is resolved against the
    /// directory of the `.npmrc` that declares it.
    pub cache_dir: PathBuf,

    /// How long, in seconds, cached metadata and subtrees stay fresh.
    ///
    /// Default value is 86400 (1 day)
    #[serde(deserialize_with = "deserialize_u64")]
    pub cache_ttl: u64,

    /// Which cache store to use.
    pub cache_store: CacheStoreKind,
}

impl Default for Npmrc {
    fn default() -> Self {
        Npmrc {
            registry: default_registry(),
            cache_dir: default_cache_dir(),
            cache_ttl: default_cache_ttl(),
            cache_store: CacheStoreKind::default(),
        }
    }
}

/// Error type of [`Npmrc::current`].
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum LoadNpmrcError {
    #[display("Failed to read {path:?}: {error}")]
    #[diagnostic(code(deptree_npmrc::read_npmrc))]
    ReadFile {
        path: PathBuf,
        #[error(source)]
        error: io::Error,
    },

    #[display("Failed to parse {path:?}: {error}")]
    #[diagnostic(code(deptree_npmrc::parse_npmrc))]
    ParseFile {
        path: PathBuf,
        #[error(source)]
        error: serde_ini::de::Error,
    },
}

impl Npmrc {
    /// Parse the content of an `.npmrc` located in `base_dir`.
    pub fn from_ini(content: &str, base_dir: &Path) -> Result<Self, serde_ini::de::Error> {
        let mut npmrc: Npmrc = serde_ini::from_str(content)?;
        if npmrc.cache_dir.is_relative() {
            npmrc.cache_dir = base_dir.join(&npmrc.cache_dir);
        }
        Ok(npmrc)
    }

    /// Load `.npmrc` from `current_dir`, falling back to `home_dir`, falling back to defaults.
    pub fn current(current_dir: &Path, home_dir: Option<&Path>) -> Result<Self, LoadNpmrcError> {
        for dir in std::iter::once(current_dir).chain(home_dir) {
            let path = dir.join(".npmrc");
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(error) if error.kind() == io::ErrorKind::NotFound => continue,
                Err(error) => return Err(LoadNpmrcError::ReadFile { path, error }),
            };
            tracing::debug!(target: "deptree::npmrc", ?path, "Loading");
            return Npmrc::from_ini(&content, dir)
                .map_err(|error| LoadNpmrcError::ParseFile { path, error });
        }
        Ok(Npmrc::default())
    }

    /// Replace the registry, keeping the trailing slash invariant.
    pub fn with_registry(mut self, registry: &str) -> Self {
        self.registry = registry.to_string();
        if !self.registry.ends_with('/') {
            self.registry.push('/');
        }
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl.pipe(Duration::from_secs)
    }

    /// Persist the config data until the program terminates.
    pub fn leak(self) -> &'static mut Self {
        self.pipe(Box::new).pipe(Box::leak)
    }
}
