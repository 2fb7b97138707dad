use crate::State;
use clap::{Args, ValueEnum};
use derive_more::{Display, Error};
use deptree_npmrc::Npmrc;
use deptree_registry::HttpRegistry;
use deptree_resolver::{DependencyTreeBuilder, DependencyTreeNode};
use miette::{Context, Diagnostic, IntoDiagnostic};
use termtree::Tree;

/// Dist-tag used when no version is given.
const DEFAULT_VERSION: &str = "latest";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty printed JSON.
    #[default]
    Json,
    /// Indented text tree.
    Tree,
}

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// `<name> [version]` where name may be scoped (`@scope/name`),
    /// or `<@scope> <name> [version]`. The version defaults to `latest`.
    #[clap(required = true, num_args = 1..=3)]
    pub package: Vec<String>,
    /// How to print the tree.
    #[clap(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
    /// Override the registry of `.npmrc`.
    #[clap(long)]
    pub registry: Option<String>,
}

/// A package name and the specifier to resolve it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    pub package_name: String,
    pub version: String,
}

/// Error type of [`PackageRequest::parse`].
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum ParsePackageRequestError {
    #[display("Missing package name after scope {scope:?}")]
    #[diagnostic(code(deptree_cli::missing_package_name))]
    MissingPackageName {
        #[error(not(source))]
        scope: String,
    },

    #[display("Invalid scope {scope:?}: a scope starts with '@' and contains no '/'")]
    #[diagnostic(code(deptree_cli::invalid_scope))]
    InvalidScope {
        #[error(not(source))]
        scope: String,
    },

    #[display("Expected between 1 and 3 arguments, received {count}")]
    #[diagnostic(code(deptree_cli::wrong_argument_count))]
    WrongArgumentCount {
        #[error(not(source))]
        count: usize,
    },
}

fn is_bare_scope(arg: &str) -> bool {
    arg.starts_with('@') && !arg.contains('/')
}

impl PackageRequest {
    fn new(package_name: impl Into<String>, version: impl Into<String>) -> Self {
        PackageRequest { package_name: package_name.into(), version: version.into() }
    }

    /// Interpret the positional arguments of `deptree tree`.
    pub fn parse<Arg: AsRef<str>>(args: &[Arg]) -> Result<Self, ParsePackageRequestError> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        match args.as_slice() {
            [scope] if is_bare_scope(scope) => {
                Err(ParsePackageRequestError::MissingPackageName { scope: scope.to_string() })
            }
            [name] => Ok(PackageRequest::new(*name, DEFAULT_VERSION)),
            [scope, name] if is_bare_scope(scope) => {
                Ok(PackageRequest::new(format!("{scope}/{name}"), DEFAULT_VERSION))
            }
            [name, version] => Ok(PackageRequest::new(*name, *version)),
            [scope, name, version] if is_bare_scope(scope) => {
                Ok(PackageRequest::new(format!("{scope}/{name}"), *version))
            }
            [scope, _, _] => {
                Err(ParsePackageRequestError::InvalidScope { scope: scope.to_string() })
            }
            _ => Err(ParsePackageRequestError::WrongArgumentCount { count: args.len() }),
        }
    }
}

/// Label of a node in the text tree.
fn node_label(node: &DependencyTreeNode) -> String {
    let version = node.resolved_version.as_deref().unwrap_or(&node.version);
    let mut label = format!("{}@{version}", node.package_name);
    if node.cycle {
        label.push_str(" (cycle)");
    }
    label
}

/// Convert a dependency tree into a printable [`Tree`].
pub fn render_tree(node: &DependencyTreeNode) -> Tree<String> {
    Tree::new(node_label(node)).with_leaves(node.dependencies.iter().map(render_tree))
}

impl TreeArgs {
    /// Execute the subcommand.
    pub async fn run(self, config: Npmrc) -> miette::Result<()> {
        let TreeArgs { package, format, registry } = self;
        let request = PackageRequest::parse(&package)?;

        let config = match registry {
            Some(registry) => config.with_registry(&registry),
            None => config,
        };
        let State { http_client, config, cache } = State::init(config.leak());

        let registry = HttpRegistry { http_client: &http_client, registry: &config.registry };
        let tree = DependencyTreeBuilder::new(&registry, &*cache, config.cache_ttl())
            .build_tree(&request.package_name, &request.version)
            .await?;

        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&tree)
                    .into_diagnostic()
                    .wrap_err("serialize the dependency tree")?;
                println!("{json}");
            }
            OutputFormat::Tree => print!("{}", render_tree(&tree)),
        }

        Ok(())
    }
}
