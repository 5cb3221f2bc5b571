//! Prometheus exporter for Rubrik cluster storage statistics.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use rubrik_common::{ClusterClient, Credentials, init_tracing};
use rubrik_exporter_prometheus::{ExporterConfig, HttpServer, Poller, StorageMetrics};

/// Prometheus exporter for Rubrik cluster storage statistics.
#[derive(Parser, Debug)]
#[command(name = "rubrik-exporter-prometheus")]
#[command(about = "Export Rubrik cluster storage statistics as Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long, env = "RUBRIK_EXPORTER_CONFIG")]
    config: Option<String>,

    /// HTTP listen address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Log level (overrides config).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        ExporterConfig::load_from_file(config_path)?
    } else {
        ExporterConfig::default()
    };

    // Override from CLI
    if let Some(listen) = args.listen {
        config.prometheus.listen = listen;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    init_tracing(&config.logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Rubrik storage exporter");

    let credentials = Credentials::from_env()?;
    info!(
        cluster = %credentials.address(),
        username = %credentials.username(),
        verify_tls = config.cluster.verify_tls,
        "Loaded cluster credentials"
    );
    let client = ClusterClient::new(credentials, &config.cluster)?;

    let metrics = Arc::new(StorageMetrics::new(
        &config.prometheus.prefix,
        config.polling.runway,
    ));

    // Parse listen address
    let listen_addr: SocketAddr = config
        .prometheus
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // The metrics endpoint is up before the first poll
    let http_server = HttpServer::new(
        metrics.clone(),
        listen_addr,
        config.prometheus.path.clone(),
    );
    let listener = http_server.bind().await?;

    let http_shutdown = shutdown_rx.clone();
    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.serve(listener, http_shutdown).await {
            error!("HTTP server error: {}", e);
        }
    });

    let poller = Poller::new(
        client,
        metrics.clone(),
        Duration::from_secs(config.polling.interval_secs),
    );
    let poller_task = tokio::spawn(poller.run(shutdown_rx.clone()));

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate_signal() => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    // Signal shutdown
    shutdown_tx.send(true)?;

    // Wait for tasks to complete
    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        let _ = poller_task.await;
        let _ = http_task.await;
    })
    .await;

    // Print final stats
    let stats = metrics.stats();
    info!(
        polls_succeeded = stats.polls_succeeded,
        polls_failed = stats.polls_failed,
        last_success_unix = stats.last_success_unix,
        "Final statistics"
    );

    info!("Exporter stopped");
    Ok(())
}

#[cfg(unix)]
async fn terminate_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate_signal() {
    std::future::pending::<()>().await;
}
