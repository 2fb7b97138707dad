pub mod cache;
pub mod tree;

use cache::CacheCommand;
use clap::{Parser, Subcommand};
use deptree_npmrc::Npmrc;
use miette::{Context, IntoDiagnostic};
use std::{env, path::PathBuf};
use tree::TreeArgs;

/// Print the transitive dependency tree of npm packages.
#[derive(Debug, Parser)]
#[clap(name = "deptree")]
#[clap(bin_name = "deptree")]
#[clap(version)]
#[clap(about = "Print the transitive dependency tree of npm packages")]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: CliCommand,

    /// Set working directory.
    #[clap(short = 'C', long, default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Resolve a package and all of its dependencies
    Tree(TreeArgs),
    /// Manage the metadata and subtree cache.
    #[clap(subcommand)]
    Cache(CacheCommand),
}

impl CliArgs {
    /// Execute the command
    pub async fn run(self) -> miette::Result<()> {
        let CliArgs { command, dir } = self;
        let dir = if dir.is_absolute() {
            dir
        } else {
            env::current_dir().into_diagnostic().wrap_err("get the current directory")?.join(dir)
        };
        // `components` drops the `.` segments.
        let dir: PathBuf = dir.components().collect();
        let npmrc = || {
            Npmrc::current(&dir, home::home_dir().as_deref()).wrap_err("load the configuration")
        };

        match command {
            CliCommand::Tree(args) => args.run(npmrc()?).await,
            CliCommand::Cache(command) => command.run(&npmrc()?).await,
        }
    }
}
