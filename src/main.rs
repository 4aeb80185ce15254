mod cli;
mod telemetry;

use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing(telemetry::DEFAULT_FILTER);
    let cli = Cli::parse();
    cli.run().await
}
