use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use boundary_watch::fetch::HttpFetcher;
use boundary_watch::store::SqliteStore;
use boundary_watch::{pipeline, Config, RunOptions};

/// Watch the boundary commission website for review lifecycle changes.
#[derive(Debug, Parser)]
#[command(name = "boundary-watch")]
struct Cli {
    /// Seed an empty store: relax history checks and send no notifications.
    #[arg(long)]
    bootstrap: bool,

    /// Run the pipeline but skip notification dispatch.
    #[arg(long)]
    no_notify: bool,

    /// Write the accepted snapshot as sorted JSON to this path.
    #[arg(long)]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,boundary_watch=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let connect = SqliteConnectOptions::from_str(&config.database_url)
        .context("DATABASE_URL is not a valid sqlite URL")?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect)
        .await
        .context("Failed to open database")?;

    let store = SqliteStore::new(pool);
    store.ensure_schema().await.context("Failed to create schema")?;

    let sinks = config.sinks();
    if sinks.is_empty() && !cli.no_notify && !cli.bootstrap {
        tracing::warn!("No notification sinks configured; events will only be logged");
    }

    let fetcher =
        HttpFetcher::new(config.index_url.clone()).context("Failed to build HTTP client")?;

    let options = RunOptions {
        bootstrap: cli.bootstrap,
        send_notifications: !cli.bootstrap && !cli.no_notify,
        index_url: config.index_url,
        export_path: cli.export,
    };

    let summary = pipeline::run(&fetcher, &store, &sinks, &options).await?;

    tracing::info!(
        reviews = summary.reviews,
        events = summary.events.len(),
        dispatch_failures = summary.dispatch_failures,
        "boundary-watch finished"
    );

    Ok(())
}
