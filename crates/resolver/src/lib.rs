mod build_tree;
mod dependency_tree_node;
mod error;
mod metadata_source;
mod package_versions;
mod resolve_version;
mod tree_path;

pub use build_tree::DependencyTreeBuilder;
pub use dependency_tree_node::DependencyTreeNode;
pub use error::{BuildTreeError, PackageNotFoundError};
pub use metadata_source::PackageMetadataSource;
pub use package_versions::PackageVersions;
pub use resolve_version::{resolve_version, VersionNotFoundError};
pub use tree_path::TreePath;
