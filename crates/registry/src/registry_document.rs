use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The subset of a registry packument that dependency resolution reads.
///
/// `versions` is required: a document without it can't describe any release
/// and fails to deserialize.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDocument {
    pub versions: IndexMap<String, RegistryVersion>,
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: IndexMap<String, String>,
}

/// A single published version inside a [`RegistryDocument`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<IndexMap<String, String>>,
}
