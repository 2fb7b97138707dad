use derive_more::{Display, Error};
use indexmap::IndexMap;
use miette::Diagnostic;
use node_semver::{Range, Version};

/// No published version or dist-tag of a package matches the requested specifier.
#[derive(Debug, Display, Error, Diagnostic, PartialEq, Eq)]
#[display("Version '{requested}' for package '{package_name}' not found.")]
#[diagnostic(code(deptree_resolver::version_not_found))]
pub struct VersionNotFoundError {
    pub package_name: String,
    pub requested: String,
}

/// Match a specifier to one of the `available_versions` of `package_name`.
///
/// The first rule that produces a version wins:
/// 1. `requested` is one of the available versions verbatim.
/// 2. `requested` is a valid semver range: the highest satisfying version.
/// 3. `requested` is a dist-tag pointing to an available version.
pub fn resolve_version<'a, Versions>(
    package_name: &str,
    requested: &str,
    available_versions: Versions,
    distribution_tags: &IndexMap<String, String>,
) -> Result<String, VersionNotFoundError>
where
    Versions: IntoIterator<Item = &'a str>,
{
    let available_versions: Vec<&str> = available_versions.into_iter().collect();

    if available_versions.contains(&requested) {
        return Ok(requested.to_string());
    }

    // an empty specifier means any version
    let range_text = if requested.trim().is_empty() { "*" } else { requested };
    if let Ok(range) = range_text.parse::<Range>() {
        let max_satisfying = available_versions
            .iter()
            .filter_map(|version| version.parse::<Version>().ok().map(|parsed| (parsed, *version)))
            .filter(|(parsed, _)| parsed.satisfies(&range))
            .max_by(|(a, _), (b, _)| a.cmp(b));
        if let Some((_, version)) = max_satisfying {
            return Ok(version.to_string());
        }
    }

    if let Some(version) = distribution_tags.get(requested) {
        if available_versions.contains(&version.as_str()) {
            return Ok(version.clone());
        }
        tracing::debug!(target: "deptree::resolve", ?package_name, tag = ?requested, ?version, "Dist-tag points to an unpublished version");
    }

    Err(VersionNotFoundError {
        package_name: package_name.to_string(),
        requested: requested.to_string(),
    })
}
