use async_trait::async_trait;
use dashmap::DashMap;
use deptree_registry::{RegistryDocument, RegistryError, RegistryFetcher, RegistryVersion};
use indexmap::IndexMap;
use reqwest::StatusCode;
use std::collections::HashMap;

/// In-memory [`RegistryFetcher`] that counts how often each package is fetched.
#[derive(Debug, Default)]
pub struct FakeRegistry {
    documents: HashMap<String, RegistryDocument>,
    fetch_counts: DashMap<String, usize>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        FakeRegistry::default()
    }

    /// Add `version` of `name` with `dependencies` in declaration order.
    pub fn publish(mut self, name: &str, version: &str, dependencies: &[(&str, &str)]) -> Self {
        let dependencies: IndexMap<String, String> = dependencies
            .iter()
            .map(|(name, version_range)| (name.to_string(), version_range.to_string()))
            .collect();
        let dependencies = (!dependencies.is_empty()).then_some(dependencies);
        self.document_mut(name)
            .versions
            .insert(version.to_string(), RegistryVersion { dependencies });
        self
    }

    /// Point the dist-tag `tag` of `name` at `version`.
    pub fn tag(mut self, name: &str, tag: &str, version: &str) -> Self {
        self.document_mut(name).dist_tags.insert(tag.to_string(), version.to_string());
        self
    }

    /// Number of times `name` was fetched, successfully or not.
    pub fn fetch_count(&self, name: &str) -> usize {
        self.fetch_counts.get(name).map_or(0, |count| *count)
    }

    /// Number of fetches across all packages.
    pub fn total_fetch_count(&self) -> usize {
        self.fetch_counts.iter().map(|entry| *entry.value()).sum()
    }

    fn document_mut(&mut self, name: &str) -> &mut RegistryDocument {
        self.documents.entry(name.to_string()).or_default()
    }
}

#[async_trait]
impl RegistryFetcher for FakeRegistry {
    async fn fetch_package(&self, name: &str) -> Result<RegistryDocument, RegistryError> {
        *self.fetch_counts.entry(name.to_string()).or_insert(0) += 1;
        self.documents.get(name).cloned().ok_or_else(|| RegistryError::Status {
            url: format!("fake-registry:{name}"),
            status: StatusCode::NOT_FOUND,
        })
    }
}
