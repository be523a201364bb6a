use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    festchain_cli::run().await?;
    Ok(())
}
