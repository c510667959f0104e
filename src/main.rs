//! MutualRisk - portfolio construction and backtesting in the terminal.

use clap::Parser;
use mutualrisk::{App, Config, Result, config};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Terminal client for the MutualRisk portfolio backend.
#[derive(Debug, Parser)]
#[command(name = "mutualrisk", version, about)]
struct Cli {
    /// Configuration file (defaults to the platform config directory).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the API base URL.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The terminal is in raw mode, so logs go to a daily file instead of stderr.
    let log_dir = config::log_dir()?;
    std::fs::create_dir_all(&log_dir)?;
    let appender = tracing_appender::rolling::daily(&log_dir, "mutualrisk.log");
    let (writer, _guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "mutualrisk=info".into()))
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_target(false)
                .with_ansi(false),
        )
        .init();

    let mut config = Config::load(cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }

    let mut app = App::new(config).await?;
    let result = app.run().await;
    drop(app);

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application exited with an error");
    }
    result
}
