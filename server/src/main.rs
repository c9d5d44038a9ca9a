mod config;
mod openfoodfacts;
mod server;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "intake-server",
    version,
    about = "Serves the intake nutrition history document over HTTP"
)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,
    /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,
    /// Path to the history document (default: history.json in the platform data directory)
    #[arg(long, value_name = "PATH")]
    data_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intake_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let history_path = match cli.data_file {
        Some(path) => path,
        None => Config::load()?.history_path,
    };
    server::start_server(history_path, cli.port, &cli.bind).await
}
