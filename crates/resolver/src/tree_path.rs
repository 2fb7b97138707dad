use indexmap::IndexSet;

/// The `{name}@{version}` keys on the branch currently being expanded, from
/// the root to the active node.
///
/// Completed branches leave the path, so a package reachable from two
/// unrelated parents is expanded under both. Only a package that is its own
/// ancestor is reported as a cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TreePath {
    keys: IndexSet<String>,
}

impl TreePath {
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Push `key` before descending into its dependencies.
    ///
    /// Returns `false` if the key was already on the path.
    pub fn enter(&mut self, key: String) -> bool {
        self.keys.insert(key)
    }

    /// Pop `key` once all its dependencies are complete.
    pub fn leave(&mut self, key: &str) -> bool {
        self.keys.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys from the root down.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}
