use clap::Parser;
use pls::cli::Cli;
use tracing::debug;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Logs go to stderr; stdout is reserved for results
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level())
        .init();

    debug!("Starting pls v{}", env!("CARGO_PKG_VERSION"));

    cli.run().await?;

    Ok(())
}
