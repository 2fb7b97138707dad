use crate::VersionNotFoundError;
use derive_more::{Display, Error, From};
use deptree_registry::RegistryError;
use miette::Diagnostic;

/// The registry couldn't supply the document of a package.
///
/// Missing packages and unreachable registries are reported the same way.
#[derive(Debug, Display, Error, Diagnostic)]
#[display("Package '{package_name}' not found.")]
#[diagnostic(code(deptree_resolver::package_not_found))]
pub struct PackageNotFoundError {
    pub package_name: String,
    #[error(source)]
    pub error: RegistryError,
}

/// Error type of [`DependencyTreeBuilder::build_tree`](crate::DependencyTreeBuilder::build_tree).
#[derive(Debug, Display, Error, From, Diagnostic)]
#[non_exhaustive]
pub enum BuildTreeError {
    #[diagnostic(transparent)]
    PackageNotFound(PackageNotFoundError),

    #[diagnostic(transparent)]
    VersionNotFound(VersionNotFoundError),
}

impl BuildTreeError {
    /// Name of the package that aborted the resolution.
    pub fn package_name(&self) -> &str {
        match self {
            BuildTreeError::PackageNotFound(error) => &error.package_name,
            BuildTreeError::VersionNotFound(error) => &error.package_name,
        }
    }
}
