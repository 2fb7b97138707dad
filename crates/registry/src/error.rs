use derive_more::{Display, Error};
use miette::Diagnostic;
use reqwest::StatusCode;

/// Error type of [`RegistryFetcher::fetch_package`](crate::RegistryFetcher::fetch_package).
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum RegistryError {
    #[display("Failed to fetch {url}: {error}")]
    #[diagnostic(code(deptree_registry::network))]
    Network {
        url: String,
        #[error(source)]
        error: reqwest::Error,
    },

    #[display("Registry responded to {url} with {status}")]
    #[diagnostic(code(deptree_registry::status))]
    Status { url: String, status: StatusCode },

    #[display("Failed to parse the registry document from {url}: {error}")]
    #[diagnostic(code(deptree_registry::invalid_document))]
    InvalidDocument {
        url: String,
        #[error(source)]
        error: serde_json::Error,
    },
}

impl RegistryError {
    /// Whether the registry reported that the package doesn't exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::Status { status: StatusCode::NOT_FOUND, .. })
    }
}
