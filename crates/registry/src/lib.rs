mod error;
mod http_registry;
mod registry_document;

pub use error::RegistryError;
pub use http_registry::HttpRegistry;
pub use registry_document::{RegistryDocument, RegistryVersion};

use async_trait::async_trait;

/// Source of raw registry documents.
///
/// Implementations perform the outbound call only. Caching and retry policy
/// belong to the caller and to the HTTP stack respectively.
#[async_trait]
pub trait RegistryFetcher: Send + Sync {
    /// Fetch the full document (all published versions and dist-tags) of `name`.
    async fn fetch_package(&self, name: &str) -> Result<RegistryDocument, RegistryError>;
}
