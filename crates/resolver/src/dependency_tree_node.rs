use deptree_cache::cache_key;
use serde::{Deserialize, Serialize};

/// One occurrence of a package in a dependency tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyTreeNode {
    /// Name of the package, including its scope if any.
    pub package_name: String,
    /// Specifier as declared by the parent: a version, a range or a dist-tag.
    pub version: String,
    /// Concrete version the specifier resolved to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_version: Option<String>,
    /// Children in the declaration order of the resolved version.
    #[serde(default)]
    pub dependencies: Vec<DependencyTreeNode>,
    /// This package at this version is already an ancestor of the node.
    /// Its dependencies are not expanded again.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cycle: bool,
}

impl DependencyTreeNode {
    /// Create an unresolved node.
    pub fn new(package_name: impl Into<String>, version: impl Into<String>) -> Self {
        DependencyTreeNode {
            package_name: package_name.into(),
            version: version.into(),
            resolved_version: None,
            dependencies: Vec::new(),
            cycle: false,
        }
    }

    /// `{name}@{resolved_version}`, once resolved.
    pub fn tree_path_key(&self) -> Option<String> {
        self.resolved_version.as_deref().map(|version| cache_key(&self.package_name, Some(version)))
    }

    /// Number of nodes in the subtree, this one included.
    pub fn count_nodes(&self) -> usize {
        1 + self.dependencies.iter().map(DependencyTreeNode::count_nodes).sum::<usize>()
    }
}
