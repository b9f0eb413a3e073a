use clap::Parser;
use sportmate::{AppResult, Cli, commands, init_tracing, load_config};

#[tokio::main]
async fn main() {
    if let Err(error) = start().await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn start() -> AppResult<()> {
    let cli = Cli::parse();
    let config_path = cli.config_path();
    let config = load_config(&cli)?;

    init_tracing(&config.log_level);
    if config_path.exists() {
        tracing::debug!(path = ?config_path, "loaded config");
    } else {
        tracing::info!(path = ?config_path, "config file not found, using defaults");
    }

    commands::run(cli, config).await
}
