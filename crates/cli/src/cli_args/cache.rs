use clap::Subcommand;
use deptree_cache::{CacheStore, DiskCacheStore};
use deptree_npmrc::Npmrc;
use miette::Context;

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Returns the path to the cache directory.
    Path,
    /// Removes every cached package document and subtree.
    Clear,
}

impl CacheCommand {
    /// Execute the subcommand.
    pub async fn run(self, config: &Npmrc) -> miette::Result<()> {
        match self {
            CacheCommand::Path => {
                println!("{}", config.cache_dir.display());
            }
            CacheCommand::Clear => {
                // the memory store never outlives a command, only the directory needs clearing
                DiskCacheStore::new(&config.cache_dir)
                    .clear()
                    .await
                    .wrap_err("clearing the cache directory")?;
            }
        }

        Ok(())
    }
}
