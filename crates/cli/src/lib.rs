mod cli_args;
mod state;

use clap::Parser;
use cli_args::CliArgs;
use deptree_diagnostics::enable_tracing_by_env;
use state::State;

pub async fn run_cli() -> miette::Result<()> {
    enable_tracing_by_env();
    CliArgs::parse().run().await
}
