use assert_cmd::prelude::*;
use command_extra::CommandExtra;
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};
use tempfile::{tempdir, TempDir};
use text_block_macros::text_block_fnl;

const DEFAULT_NPMRC: &str = text_block_fnl! {
    "cache-dir=../deptree-cache"
};

/// Write `.npmrc` into `workspace` with a cache directory beside it and the given `registry`.
pub fn create_npmrc(workspace: &Path, registry: &str, cache_store: &str) {
    let content = format!("{DEFAULT_NPMRC}registry={registry}\ncache-store={cache_store}\n");
    fs::write(workspace.join(".npmrc"), content).expect("write to .npmrc");
}

/// Create a temporary workspace and a `deptree` command that runs inside it.
///
/// Returns the command, the temporary root (keep it alive) and the workspace path.
/// The cache directory of the default `.npmrc` is `<root>/deptree-cache`.
pub fn deptree_with_temp_cwd(registry: Option<&str>) -> (Command, TempDir, PathBuf) {
    let root = tempdir().expect("create temporary directory");
    let workspace = root.path().join("workspace");
    fs::create_dir(&workspace).expect("create temporary workspace for deptree");
    if let Some(registry) = registry {
        create_npmrc(&workspace, registry, "disk");
    }
    let command = Command::cargo_bin("deptree")
        .expect("find the deptree binary")
        .with_current_dir(&workspace);
    (command, root, workspace)
}
