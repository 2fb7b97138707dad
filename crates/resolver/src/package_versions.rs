use crate::{resolve_version, VersionNotFoundError};
use deptree_registry::RegistryDocument;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Snapshot of what the registry knows about a package: the direct
/// dependencies of every published version and the dist-tags.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageVersions {
    /// Version → dependency name → requested specifier, in declaration order.
    pub versions_dependencies: IndexMap<String, IndexMap<String, String>>,
    /// Dist-tag → version.
    pub distribution_tags: IndexMap<String, String>,
}

impl From<RegistryDocument> for PackageVersions {
    fn from(document: RegistryDocument) -> Self {
        let RegistryDocument { versions, dist_tags } = document;
        let versions_dependencies = versions
            .into_iter()
            .map(|(version, manifest)| (version, manifest.dependencies.unwrap_or_default()))
            .collect();
        PackageVersions { versions_dependencies, distribution_tags: dist_tags }
    }
}

impl PackageVersions {
    /// All published versions.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.versions_dependencies.keys().map(String::as_str)
    }

    /// Match `requested` against the published versions and dist-tags.
    pub fn resolve(&self, package_name: &str, requested: &str) -> Result<String, VersionNotFoundError> {
        resolve_version(package_name, requested, self.versions(), &self.distribution_tags)
    }

    /// Direct dependencies of `version` in declaration order.
    pub fn dependencies_of(&self, version: &str) -> impl Iterator<Item = (&str, &str)> {
        self.versions_dependencies
            .get(version)
            .into_iter()
            .flatten()
            .map(|(name, version_range)| (name.as_str(), version_range.as_str()))
    }
}
