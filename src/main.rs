//! Tic-tac-toe client - unified CLI
//!
//! Terminal browser plus a few scripting helpers around the router.

#![warn(missing_docs)]

mod cli;

use anyhow::{Result, anyhow};
use clap::Parser;
use cli::{Cli, Command, Common};
use tictactoe_webapp::{AppConfig, OutlineLine, tui};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Browse { common, start_url } => {
            let mut config = load_config(&common)?;
            if let Some(url) = start_url {
                config = config.with_start_url(url);
            }
            tui::run_tui(config).await
        }
        Command::Show { common, url } => run_show(load_config(&common)?, url).await,
        Command::Resolve { common, url } => run_resolve(load_config(&common)?, url),
        Command::Version { common } => run_version(load_config(&common)?).await,
    }
}

fn load_config(common: &Common) -> Result<AppConfig> {
    let mut config = AppConfig::load(Some(common.config.as_path()))?;
    if let Some(url) = &common.server_url {
        config = config.with_server_url(url.clone());
    }
    Ok(config)
}

fn init_stderr_tracing(config: &AppConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn outline_text(lines: &[OutlineLine]) -> String {
    lines
        .iter()
        .map(|line| {
            let spans: Vec<&str> = line.spans.iter().map(|s| s.text.as_str()).collect();
            format!("{}{}", "  ".repeat(line.depth), spans.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a location once and print it
#[instrument(skip(config))]
async fn run_show(config: AppConfig, url: String) -> Result<()> {
    init_stderr_tracing(&config);
    let (app, surface) = tui::build_app(config.with_start_url(url))?;
    app.start().await;
    info!(phase = %app.phase(), "Rendered");
    println!("{}", outline_text(&surface.outline()));
    Ok(())
}

/// Print the resolution of a location
#[instrument(skip(config))]
fn run_resolve(config: AppConfig, url: String) -> Result<()> {
    init_stderr_tracing(&config);
    let (app, _surface) = tui::build_app(config)?;
    let resolution = app
        .resolve(Some(&url))
        .ok_or_else(|| anyhow!("No state registered for {}", url))?;
    resolution.state.set_last_match(resolution.captures.clone());
    println!("state:     {}", resolution.state.id());
    println!("title:     {}", resolution.state.title());
    println!("captures:  {:?}", resolution.captures);
    if let Some(canonical) = resolution.state.canonical_url() {
        println!("canonical: {}", canonical);
    }
    Ok(())
}

/// Print the server build identifier
#[instrument(skip(config))]
async fn run_version(config: AppConfig) -> Result<()> {
    init_stderr_tracing(&config);
    let (app, _surface) = tui::build_app(config)?;
    let hash = app
        .version_hash()
        .await
        .ok_or_else(|| anyhow!("Server did not report a version"))?;
    println!("{}", hash);
    Ok(())
}
