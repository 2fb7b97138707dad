use crate::{BuildTreeError, DependencyTreeNode, PackageMetadataSource, TreePath};
use async_recursion::async_recursion;
use deptree_cache::{cache_key, get_json, set_json, CacheStore};
use deptree_registry::RegistryFetcher;
use std::time::Duration;

/// Resolves the full dependency tree of a package.
///
/// **Brief overview for each node:**
/// * Get the versions of the package from [`PackageMetadataSource`].
/// * Resolve the requested specifier to a concrete version.
/// * Stop with `cycle = true` if `{name}@{version}` is already an ancestor.
/// * Adopt the dependencies of a cached subtree if there is one.
/// * Otherwise expand every dependency depth-first, then cache the subtree.
///
/// Any package or version that can't be found aborts the whole tree.
#[must_use]
#[derive(Clone, Copy)]
pub struct DependencyTreeBuilder<'a> {
    pub metadata_source: PackageMetadataSource<'a>,
    /// Store of completed subtrees, keyed by `{name}@{version}`.
    pub subtree_cache: &'a dyn CacheStore,
    /// Lifetime of the subtree entries.
    pub cache_ttl: Duration,
}

impl<'a> DependencyTreeBuilder<'a> {
    /// Use a single store for both package metadata and subtrees.
    pub fn new(
        registry: &'a dyn RegistryFetcher,
        cache: &'a dyn CacheStore,
        cache_ttl: Duration,
    ) -> Self {
        DependencyTreeBuilder {
            metadata_source: PackageMetadataSource { registry, cache, cache_ttl },
            subtree_cache: cache,
            cache_ttl,
        }
    }

    /// Resolve `package_name` at `requested_version` and all of its transitive dependencies.
    pub async fn build_tree(
        &self,
        package_name: &str,
        requested_version: &str,
    ) -> Result<DependencyTreeNode, BuildTreeError> {
        tracing::info!(target: "deptree::build_tree", ?package_name, ?requested_version, "Start");

        let mut root = DependencyTreeNode::new(package_name, requested_version);
        let mut tree_path = TreePath::default();
        self.deep_search(&mut root, &mut tree_path).await?;

        tracing::info!(target: "deptree::build_tree", ?package_name, ?requested_version, nodes = root.count_nodes(), "Complete");
        Ok(root)
    }

    #[async_recursion]
    async fn deep_search(
        &self,
        node: &mut DependencyTreeNode,
        tree_path: &mut TreePath,
    ) -> Result<(), BuildTreeError> {
        let package_versions =
            self.metadata_source.get_package_versions(&node.package_name).await?;
        let resolved_version = package_versions.resolve(&node.package_name, &node.version)?;
        let tree_path_key = cache_key(&node.package_name, Some(&resolved_version));
        node.resolved_version = Some(resolved_version.clone());

        if self.try_short_circuit_cycle(node, tree_path, &tree_path_key) {
            return Ok(());
        }

        if self.try_adopt_cached_subtree(node, &tree_path_key).await {
            return Ok(());
        }

        tree_path.enter(tree_path_key.clone());

        for (name, version_range) in package_versions.dependencies_of(&resolved_version) {
            let mut child = DependencyTreeNode::new(name, version_range);
            self.deep_search(&mut child, tree_path).await?;
            node.dependencies.push(child);
        }

        tree_path.leave(&tree_path_key);

        self.cache_dependency_tree_node(node).await;

        Ok(())
    }

    /// Mark `node` as a cycle if its key is already on the active branch.
    ///
    /// A cycle node keeps no dependencies and is never read from or written to the cache.
    pub fn try_short_circuit_cycle(
        &self,
        node: &mut DependencyTreeNode,
        tree_path: &TreePath,
        tree_path_key: &str,
    ) -> bool {
        if !tree_path.contains(tree_path_key) {
            return false;
        }

        tracing::info!(
            target: "deptree::build_tree",
            key = ?tree_path_key,
            path = ?tree_path.iter().collect::<Vec<_>>(),
            "Dependency cycle detected",
        );
        node.cycle = true;
        node.dependencies.clear();
        true
    }

    /// Copy the dependencies of a previously completed subtree into `node`.
    ///
    /// Only reads the subtree cache. Entries that can't be read count as misses.
    pub async fn try_adopt_cached_subtree(
        &self,
        node: &mut DependencyTreeNode,
        tree_path_key: &str,
    ) -> bool {
        match get_json::<DependencyTreeNode>(self.subtree_cache, tree_path_key).await {
            Ok(Some(cached_node)) => {
                tracing::debug!(target: "deptree::build_tree", key = ?tree_path_key, "Reuse cached subtree");
                node.dependencies = cached_node.dependencies;
                true
            }
            Ok(None) => false,
            Err(error) => {
                tracing::warn!(target: "deptree::build_tree", key = ?tree_path_key, %error, "Failed to read cache");
                false
            }
        }
    }

    /// Write a completed node to the subtree cache. Failures are only logged.
    async fn cache_dependency_tree_node(&self, node: &DependencyTreeNode) {
        let Some(key) = node.tree_path_key() else {
            return;
        };
        if let Err(error) = set_json(self.subtree_cache, &key, node, self.cache_ttl).await {
            tracing::warn!(target: "deptree::build_tree", ?key, %error, "Failed to write cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VersionNotFoundError;
    use deptree_cache::MemoryCacheStore;
    use deptree_testing_utils::{FailingCacheStore, FakeRegistry, RecordingCacheStore};
    use pretty_assertions::assert_eq;

    const TTL: Duration = Duration::from_secs(60);

    fn resolved(name: &str, version: &str, resolved_version: &str) -> DependencyTreeNode {
        DependencyTreeNode {
            resolved_version: Some(resolved_version.to_string()),
            ..DependencyTreeNode::new(name, version)
        }
    }

    fn with_dependencies(
        node: DependencyTreeNode,
        dependencies: impl IntoIterator<Item = DependencyTreeNode>,
    ) -> DependencyTreeNode {
        DependencyTreeNode { dependencies: dependencies.into_iter().collect(), ..node }
    }

    fn cycle(name: &str, version: &str, resolved_version: &str) -> DependencyTreeNode {
        DependencyTreeNode { cycle: true, ..resolved(name, version, resolved_version) }
    }

    #[tokio::test]
    async fn resolves_the_whole_tree_in_declaration_order() {
        let registry = FakeRegistry::new()
            .publish("my-package", "1.0.0", &[])
            .publish("my-package", "1.0.1", &[("zeta", "^2.0.0"), ("alpha", "latest")])
            .publish("zeta", "2.1.0", &[("alpha", "1.0.0")])
            .publish("alpha", "1.0.0", &[])
            .publish("alpha", "1.1.0", &[])
            .tag("alpha", "latest", "1.1.0");
        let cache = MemoryCacheStore::new();

        let tree = DependencyTreeBuilder::new(&registry, &cache, TTL)
            .build_tree("my-package", "^1.0.0")
            .await
            .unwrap();

        let expected = with_dependencies(
            resolved("my-package", "^1.0.0", "1.0.1"),
            [
                with_dependencies(
                    resolved("zeta", "^2.0.0", "2.1.0"),
                    [resolved("alpha", "1.0.0", "1.0.0")],
                ),
                resolved("alpha", "latest", "1.1.0"),
            ],
        );
        assert_eq!(tree, expected);
    }

    #[tokio::test]
    async fn cycle_terminates() {
        let registry = FakeRegistry::new()
            .publish("a", "1.0.0", &[("b", "^1.0.0")])
            .publish("b", "1.0.0", &[("a", "1.0.0")]);
        let cache = MemoryCacheStore::new();

        let tree = DependencyTreeBuilder::new(&registry, &cache, TTL)
            .build_tree("a", "1.0.0")
            .await
            .unwrap();

        let expected = with_dependencies(
            resolved("a", "1.0.0", "1.0.0"),
            [with_dependencies(resolved("b", "^1.0.0", "1.0.0"), [cycle("a", "1.0.0", "1.0.0")])],
        );
        assert_eq!(tree, expected);
    }

    #[tokio::test]
    async fn self_dependency_is_a_cycle() {
        let registry = FakeRegistry::new().publish("a", "1.0.0", &[("a", "*")]);
        let cache = MemoryCacheStore::new();

        let tree = DependencyTreeBuilder::new(&registry, &cache, TTL)
            .build_tree("a", "1.0.0")
            .await
            .unwrap();

        assert_eq!(tree.dependencies, [cycle("a", "*", "1.0.0")]);
    }

    #[tokio::test]
    async fn same_package_at_another_version_is_not_a_cycle() {
        let registry = FakeRegistry::new()
            .publish("a", "2.0.0", &[("b", "1.0.0")])
            .publish("a", "1.0.0", &[])
            .publish("b", "1.0.0", &[("a", "^1.0.0")]);
        let cache = MemoryCacheStore::new();

        let tree = DependencyTreeBuilder::new(&registry, &cache, TTL)
            .build_tree("a", "2.0.0")
            .await
            .unwrap();

        let expected = with_dependencies(
            resolved("a", "2.0.0", "2.0.0"),
            [with_dependencies(resolved("b", "1.0.0", "1.0.0"), [resolved("a", "^1.0.0", "1.0.0")])],
        );
        assert_eq!(tree, expected);
    }

    #[tokio::test]
    async fn diamond_is_expanded_on_both_branches() {
        let registry = FakeRegistry::new()
            .publish("root", "1.0.0", &[("left", "1.0.0"), ("right", "1.0.0")])
            .publish("left", "1.0.0", &[("shared", "^1.0.0")])
            .publish("right", "1.0.0", &[("shared", "1.x")])
            .publish("shared", "1.2.0", &[("leaf", "1.0.0")])
            .publish("leaf", "1.0.0", &[]);
        let cache = MemoryCacheStore::new();

        let tree = DependencyTreeBuilder::new(&registry, &cache, TTL)
            .build_tree("root", "1.0.0")
            .await
            .unwrap();

        let shared = |version| {
            with_dependencies(resolved("shared", version, "1.2.0"), [resolved("leaf", "1.0.0", "1.0.0")])
        };
        let expected = with_dependencies(
            resolved("root", "1.0.0", "1.0.0"),
            [
                with_dependencies(resolved("left", "1.0.0", "1.0.0"), [shared("^1.0.0")]),
                with_dependencies(resolved("right", "1.0.0", "1.0.0"), [shared("1.x")]),
            ],
        );
        assert_eq!(tree, expected);
        assert_eq!(registry.fetch_count("shared"), 1);
        assert_eq!(registry.fetch_count("leaf"), 1);
    }

    #[tokio::test]
    async fn completed_subtrees_are_cached() {
        let registry = FakeRegistry::new()
            .publish("a", "1.0.0", &[("b", "1.0.0")])
            .publish("b", "1.0.0", &[("a", "1.0.0")]);
        let cache = RecordingCacheStore::new();

        DependencyTreeBuilder::new(&registry, &cache, TTL).build_tree("a", "1.0.0").await.unwrap();

        // the cycle node is neither looked up nor written
        assert_eq!(cache.written_keys(), ["a", "b", "b@1.0.0", "a@1.0.0"]);
        let cached: DependencyTreeNode = get_json(&cache, "b@1.0.0").await.unwrap().unwrap();
        assert_eq!(
            cached,
            with_dependencies(resolved("b", "1.0.0", "1.0.0"), [cycle("a", "1.0.0", "1.0.0")]),
        );
    }

    #[tokio::test]
    async fn cached_subtree_is_adopted_without_descending() {
        let registry = FakeRegistry::new()
            .publish("a", "1.0.0", &[("b", "1.0.0")])
            .publish("b", "1.0.0", &[("c", "1.0.0")])
            .publish("c", "1.0.0", &[]);
        let cache = RecordingCacheStore::new();
        let builder = DependencyTreeBuilder::new(&registry, &cache, TTL);

        let subtree = builder.build_tree("b", "1.0.0").await.unwrap();
        let tree = builder.build_tree("a", "1.0.0").await.unwrap();

        assert_eq!(tree.dependencies, [subtree]);
        assert_eq!(
            cache.read_keys(),
            ["b", "b@1.0.0", "c", "c@1.0.0", "a", "a@1.0.0", "b", "b@1.0.0"],
        );
        assert_eq!(registry.fetch_count("c"), 1);
    }

    #[tokio::test]
    async fn repeated_build_is_served_from_cache() {
        let registry = FakeRegistry::new()
            .publish("a", "1.0.0", &[("b", "1.0.0"), ("c", "1.0.0")])
            .publish("b", "1.0.0", &[("c", "1.0.0")])
            .publish("c", "1.0.0", &[]);
        let cache = MemoryCacheStore::new();
        let builder = DependencyTreeBuilder::new(&registry, &cache, TTL);

        let first = builder.build_tree("a", "1.0.0").await.unwrap();
        let second = builder.build_tree("a", "1.0.0").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.total_fetch_count(), 3);
    }

    #[tokio::test]
    async fn cached_subtree_skips_metadata_of_descendants() {
        let registry = FakeRegistry::new()
            .publish("a", "1.0.0", &[("b", "1.0.0")])
            .publish("b", "1.0.0", &[]);
        let cache = MemoryCacheStore::new();
        let cached_subtree =
            with_dependencies(resolved("a", "1.0.0", "1.0.0"), [resolved("ghost", "9.0.0", "9.0.0")]);
        set_json(&cache, "a@1.0.0", &cached_subtree, TTL).await.unwrap();

        let tree = DependencyTreeBuilder::new(&registry, &cache, TTL)
            .build_tree("a", "1.0.0")
            .await
            .unwrap();

        assert_eq!(tree, cached_subtree);
        assert_eq!(registry.fetch_count("b"), 0);
        assert_eq!(registry.fetch_count("ghost"), 0);
    }

    #[tokio::test]
    async fn missing_package_aborts_the_tree() {
        let registry = FakeRegistry::new()
            .publish("a", "1.0.0", &[("b", "1.0.0"), ("missing", "^1.0.0")])
            .publish("b", "1.0.0", &[]);
        let cache = MemoryCacheStore::new();

        let error = DependencyTreeBuilder::new(&registry, &cache, TTL)
            .build_tree("a", "1.0.0")
            .await
            .unwrap_err();

        assert!(matches!(error, BuildTreeError::PackageNotFound(_)), "unexpected error: {error:?}");
        assert_eq!(error.package_name(), "missing");
        assert_eq!(error.to_string(), "Package 'missing' not found.");
    }

    #[tokio::test]
    async fn missing_version_aborts_the_tree() {
        let registry = FakeRegistry::new()
            .publish("a", "1.0.0", &[("b", "^2.0.0")])
            .publish("b", "1.0.0", &[]);
        let cache = MemoryCacheStore::new();

        let error = DependencyTreeBuilder::new(&registry, &cache, TTL)
            .build_tree("a", "1.0.0")
            .await
            .unwrap_err();

        match error {
            BuildTreeError::VersionNotFound(error) => assert_eq!(
                error,
                VersionNotFoundError {
                    package_name: "b".to_string(),
                    requested: "^2.0.0".to_string(),
                },
            ),
            error => panic!("unexpected error: {error:?}"),
        }
    }

    #[tokio::test]
    async fn cache_failures_do_not_fail_the_tree() {
        let registry = FakeRegistry::new()
            .publish("a", "1.0.0", &[("b", "1.0.0")])
            .publish("b", "1.0.0", &[]);
        let cache = FailingCacheStore;

        let tree = DependencyTreeBuilder::new(&registry, &cache, TTL)
            .build_tree("a", "1.0.0")
            .await
            .unwrap();

        assert_eq!(
            tree,
            with_dependencies(resolved("a", "1.0.0", "1.0.0"), [resolved("b", "1.0.0", "1.0.0")]),
        );
    }

    #[test]
    fn cycle_check_leaves_unrelated_nodes_alone() {
        let registry = FakeRegistry::new();
        let cache = MemoryCacheStore::new();
        let builder = DependencyTreeBuilder::new(&registry, &cache, TTL);
        let mut tree_path = TreePath::default();
        tree_path.enter("a@1.0.0".to_string());

        let mut node = resolved("a", "2.0.0", "2.0.0");
        assert!(!builder.try_short_circuit_cycle(&mut node, &tree_path, "a@2.0.0"));
        assert!(!node.cycle);

        let mut node = with_dependencies(resolved("a", "1.0.0", "1.0.0"), [resolved("b", "1", "1.0.0")]);
        assert!(builder.try_short_circuit_cycle(&mut node, &tree_path, "a@1.0.0"));
        assert_eq!(node, cycle("a", "1.0.0", "1.0.0"));
    }
}
