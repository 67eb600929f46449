mod answer;
mod app;
mod config;
mod session;
mod tui;

use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use answer::HttpAnswerClient;
use app::App;
use config::Config;
use tui::Tui;

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal chat client for the Line Drive AI answer service", long_about = None)]
struct Cli {
    #[arg(short, long, help = "Enable debug logging")]
    debug: bool,
    #[arg(long, value_name = "URL", help = "Base URL of the answer service")]
    base_url: Option<String>,
}

/// The terminal is in raw mode while the UI runs, so logs go to a file.
fn init_logging(config: &Config) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_file())
        .with_context(|| format!("cannot open log file {}", config.log_file()))?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if config.debug_enabled() { "debug" } else { "info" })
    )
    .target(env_logger::Target::Pipe(Box::new(log_file)))
    .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load();
    config.apply_overrides(cli.base_url.clone(), cli.debug.then_some(true));

    init_logging(&config)?;
    log::info!("Line Drive chat starting...");
    log::debug!("CLI args: {:?}", cli);
    log::debug!("Loaded configuration: {:?}", config);

    let answers = Arc::new(HttpAnswerClient::new(config.base_url()));
    log::info!("Using answer service at {}", answers.base_url());
    let mut app = App::new(&config, answers);

    let mut tui = Tui::new()?;
    tui.run_loop(&mut app).await?;

    log::info!("Application finished.");
    Ok(())
}
