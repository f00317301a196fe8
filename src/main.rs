mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cmd::import::{self, ImportArgs};
use crate::error::AppResult;

#[derive(Parser)]
#[command(
    name = "md2jira",
    author,
    version,
    about = "Convert a folder of markdown files into Jira tickets"
)]
struct Cli {
    #[command(flatten)]
    import: ImportArgs,
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    import::run(cli.import).await?;
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();
}
