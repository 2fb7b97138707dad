use deptree_diagnostics::Result;

#[tokio::main(flavor = "multi_thread")]
pub async fn main() -> Result<()> {
    deptree_cli::run_cli().await
}
