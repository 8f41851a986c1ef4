//! initrack - interactive combat encounter tracker

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use initrack::console::{self, Reply};
use initrack::{Config, Tracker};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tabletop combat encounter tracker
#[derive(Parser, Debug)]
#[command(name = "initrack", version, about = "Track initiative, HP and conditions")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite file for the NPC library and conditions (overrides config)
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(ref path) = args.config {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
    }
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(ref db) = args.database {
        config = config.with_database(db);
    }

    // Logs go to stderr so they don't interleave with console output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut tracker = Tracker::new(config).await?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"initrack - type 'help' for commands\n").await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match console::execute(&mut tracker, &line).await {
            Reply::Output(text) if text.is_empty() => {}
            Reply::Output(text) => {
                stdout.write_all(text.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
            Reply::Quit => break,
        }
    }

    info!("Session closed");
    Ok(())
}
