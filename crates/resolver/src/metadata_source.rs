use crate::{PackageNotFoundError, PackageVersions};
use deptree_cache::{cache_key, get_json, set_json, CacheStore};
use deptree_registry::RegistryFetcher;
use std::time::Duration;

/// Cache-aside source of [`PackageVersions`].
///
/// Cached values are returned without revalidation against the registry.
/// Cache failures are logged and never fail the lookup.
#[derive(Clone, Copy)]
pub struct PackageMetadataSource<'a> {
    pub registry: &'a dyn RegistryFetcher,
    pub cache: &'a dyn CacheStore,
    /// Lifetime of the entries written to [`PackageMetadataSource::cache`].
    pub cache_ttl: Duration,
}

impl<'a> PackageMetadataSource<'a> {
    /// Versions and dist-tags of `package_name`, from the cache if possible.
    pub async fn get_package_versions(
        &self,
        package_name: &str,
    ) -> Result<PackageVersions, PackageNotFoundError> {
        if let Some(package_versions) = self.fetch_package_versions_from_cache(package_name).await {
            tracing::debug!(target: "deptree::metadata", ?package_name, "Cache hit");
            return Ok(package_versions);
        }

        tracing::debug!(target: "deptree::metadata", ?package_name, "Cache miss");
        let package_versions = self.fetch_package_versions_from_registry(package_name).await?;
        self.cache_package_versions(package_name, &package_versions).await;
        Ok(package_versions)
    }

    /// Read the cached metadata of `package_name`. Unreadable entries count as misses.
    pub async fn fetch_package_versions_from_cache(
        &self,
        package_name: &str,
    ) -> Option<PackageVersions> {
        let key = cache_key(package_name, None);
        match get_json(self.cache, &key).await {
            Ok(package_versions) => package_versions,
            Err(error) => {
                tracing::warn!(target: "deptree::metadata", ?key, %error, "Failed to read cache");
                None
            }
        }
    }

    /// Write the metadata of `package_name` to the cache. Failures are only logged.
    pub async fn cache_package_versions(&self, package_name: &str, package_versions: &PackageVersions) {
        let key = cache_key(package_name, None);
        if let Err(error) = set_json(self.cache, &key, package_versions, self.cache_ttl).await {
            tracing::warn!(target: "deptree::metadata", ?key, %error, "Failed to write cache");
        }
    }

    /// Fetch and transform the registry document of `package_name`.
    pub async fn fetch_package_versions_from_registry(
        &self,
        package_name: &str,
    ) -> Result<PackageVersions, PackageNotFoundError> {
        self.registry.fetch_package(package_name).await.map(PackageVersions::from).map_err(|error| {
            tracing::info!(target: "deptree::metadata", ?package_name, %error, "Package not found");
            PackageNotFoundError { package_name: package_name.to_string(), error }
        })
    }
}
