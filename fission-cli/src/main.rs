use anyhow::Result;

use fission_cli::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
