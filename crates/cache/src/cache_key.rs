/// Key of a cache entry.
///
/// Package metadata lives under the bare package name, resolved subtrees under
/// `{name}@{version}`.
pub fn cache_key(package_name: &str, version: Option<&str>) -> String {
    match version {
        Some(version) => format!("{package_name}@{version}"),
        None => package_name.to_string(),
    }
}
