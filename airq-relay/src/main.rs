//! airq-relay - Main entry point
//!
//! Polls the configured feeds and serves live readings over HTTP/SSE until
//! Ctrl+C or SIGTERM.

use std::sync::Arc;

use airq_common::events::EventBus;
use airq_relay::api::buildinfo::{BUILD_PROFILE, BUILD_TIMESTAMP, GIT_HASH};
use airq_relay::api::{self, AppState};
use airq_relay::config::{Args, RelayConfig};
use airq_relay::fetcher::HttpFeedSource;
use airq_relay::poller::Poller;
use airq_relay::sink::BroadcastSink;
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first so its log level can seed the filter
    let config = RelayConfig::load(&args).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("airq_relay={0},airq_common={0},tower_http=info", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting airq-relay v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        GIT_HASH,
        BUILD_TIMESTAMP,
        BUILD_PROFILE
    );

    let bus = Arc::new(EventBus::new(config.event_capacity));
    info!(
        "Feeds: {:?}, request timeout {:?}, event capacity {}",
        config.feed_urls,
        config.request_timeout,
        bus.capacity()
    );

    let sink = Arc::new(BroadcastSink::new(Arc::clone(&bus)));
    let source = Arc::new(
        HttpFeedSource::new(config.request_timeout)
            .map_err(airq_relay::Error::from)
            .context("Failed to create HTTP client")?,
    );

    let cancel = CancellationToken::new();
    let mut poller = Poller::new(config.poller_config(), source, sink.clone())
        .with_event_bus(Arc::clone(&bus));
    let poller_cancel = cancel.clone();
    let poller_handle = tokio::spawn(async move {
        poller.run(poller_cancel).await;
    });

    let state = AppState::new(bus, sink);
    let server_cancel = cancel.clone();
    let served = api::server::run(state, config.port, async move {
        tokio::select! {
            _ = shutdown_signal() => {}
            _ = server_cancel.cancelled() => {}
        }
    })
    .await;

    cancel.cancel();
    poller_handle.await.context("Poller task panicked")?;

    served.context("HTTP server failed")?;
    info!("Shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
