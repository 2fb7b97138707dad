use derive_more::{Display, Error};
use miette::Diagnostic;
use std::{io, path::PathBuf};

/// Error type of [`CacheStore`](crate::CacheStore) operations.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum CacheError {
    #[display("Failed to access cache entry at {path:?}: {error}")]
    #[diagnostic(code(deptree_cache::io))]
    Io {
        path: PathBuf,
        #[error(source)]
        error: io::Error,
    },

    #[display("Failed to serialize cache entry {key:?}: {error}")]
    #[diagnostic(code(deptree_cache::serialize))]
    Serialize {
        key: String,
        #[error(source)]
        error: serde_json::Error,
    },

    #[display("Failed to deserialize cache entry {key:?}: {error}")]
    #[diagnostic(code(deptree_cache::deserialize))]
    Deserialize {
        key: String,
        #[error(source)]
        error: serde_json::Error,
    },
}
