//! Tweetflume Connector - Twitter stream to normalized events.
//!
//! This binary subscribes to the filtered stream, normalizes and filters
//! each status, and writes accepted events to stdout as JSON lines via a
//! bounded in-process queue.
//!
//! # Commands
//!
//! - `tweetflume-connector check`: Validate configuration and print the
//!   effective filter specification
//! - `tweetflume-connector run`: Start the connector
//!
//! # Environment Variables
//!
//! See the [`config`] module for available configuration options.
//!
//! [`config`]: tweetflume_connector::config

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tweetflume_connector::config::Config;
use tweetflume_connector::filter::ContentMatcher;
use tweetflume_connector::normalize::ContextDecorator;
use tweetflume_connector::pipeline::Pipeline;
use tweetflume_connector::session::StreamSession;
use tweetflume_connector::sink::{ChannelSink, EventSink, JsonLinesSink};
use tweetflume_connector::stream::HttpStreamClient;

/// Tweetflume Connector - Twitter stream to normalized events.
///
/// Subscribes to the filtered streaming endpoint, converts each status
/// into a normalized event, applies the client-side acceptance filter,
/// and emits accepted events downstream in arrival order.
#[derive(Parser, Debug)]
#[command(name = "tweetflume-connector")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    TWEETFLUME_CONSUMER_KEY         OAuth consumer key (required)
    TWEETFLUME_CONSUMER_SECRET      OAuth consumer secret (required)
    TWEETFLUME_ACCESS_TOKEN         OAuth access token (required)
    TWEETFLUME_ACCESS_TOKEN_SECRET  OAuth access token secret (required)
    TWEETFLUME_KEYWORDS             Comma-separated keywords to track
    TWEETFLUME_LOCATION             Bounding box swlon,swlat,nelon,nelat
    TWEETFLUME_CONTENT_FILTER       Client-side acceptance substring
    TWEETFLUME_STREAM_URL           Stream endpoint base URL
    TWEETFLUME_TAGS                 Comma-separated tags for every event
    TWEETFLUME_QUEUE_SIZE           Downstream queue capacity (default: 1000)

EXAMPLES:
    # Validate configuration
    tweetflume-connector check

    # Track keywords inside a bounding box
    export TWEETFLUME_KEYWORDS=art,museum
    export TWEETFLUME_LOCATION=-93.3,44.9,-93.1,45.0
    tweetflume-connector run
")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Validate configuration and print the effective filter specification.
    Check,

    /// Start the connector.
    ///
    /// Subscribes to the stream and emits events until interrupted.
    Run,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Check => run_check(),
        Command::Run => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to create tokio runtime")?;

            runtime.block_on(run_connector())
        }
    }
}

/// Validates configuration and prints the effective filter specification.
fn run_check() -> Result<()> {
    let config = Config::from_env().context("Configuration is invalid")?;
    let spec = config.filter_spec();

    println!("configuration OK");
    println!("  stream url:     {}", config.stream_url);
    println!(
        "  track keywords: {}",
        if spec.track_keywords.is_empty() {
            "(none)".to_string()
        } else {
            spec.track_keywords.join(",")
        }
    );
    println!(
        "  location box:   {}",
        spec.location.as_deref().unwrap_or("(none)")
    );
    println!(
        "  content filter: {}",
        config.content_filter.as_deref().unwrap_or("(none)")
    );
    if spec.is_empty() {
        println!();
        println!("note: no server-side filter configured; the subscription will be unfiltered");
    }

    Ok(())
}

/// Runs the connector until interruption or a fatal error.
async fn run_connector() -> Result<()> {
    init_logging();

    info!("Starting Tweetflume Connector");

    let config = Config::from_env().context("Failed to load configuration")?;

    info!(
        stream_url = %config.stream_url,
        keywords = ?config.keywords,
        location = ?config.location,
        content_filter = ?config.content_filter,
        "Configuration loaded"
    );

    // The client-side geofence re-parses the same string that feeds the
    // server-side locations filter.
    let bounds = config
        .bounding_box()
        .context("Failed to parse location bounding box")?;
    let matcher = config.content_filter.clone().map(ContentMatcher::new);
    let decorator = ContextDecorator::new(config.tags.clone());
    let pipeline = Pipeline::new(bounds, matcher, Box::new(decorator));

    let client = HttpStreamClient::new(&config).context("Failed to build stream client")?;
    let session = StreamSession::new(client, config.filter_spec(), pipeline);

    // Downstream queue: bounded channel drained by a JSON-lines writer task.
    let (queue_tx, mut queue_rx) = mpsc::channel(config.queue_size);
    let writer_task = tokio::spawn(async move {
        let mut writer = JsonLinesSink::new(tokio::io::stdout());
        let mut emitted: u64 = 0;
        while let Some(event) = queue_rx.recv().await {
            if let Err(e) = writer.accept(event).await {
                error!(error = %e, "Failed to write event");
                break;
            }
            emitted += 1;
        }
        emitted
    });

    // Cooperative interruption: SIGINT/SIGTERM flips the shutdown signal.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let mut sink = ChannelSink::new(queue_tx);
    let outcome = session.run(&mut sink, shutdown_rx).await;

    // Close the queue so the writer drains and exits.
    drop(sink);
    match writer_task.await {
        Ok(emitted) => info!(events = emitted, "Downstream queue drained"),
        Err(e) => error!(error = %e, "Writer task failed"),
    }

    outcome.context("Stream session failed")?;

    info!("Connector stopped");
    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
