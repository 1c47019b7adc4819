// MRL risk service - main.rs
// Loads .env, parses the CLI and hands off to the serve/assess runner.

use clap::Parser;
use mrl_risk::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    run(Cli::parse()).await
}
