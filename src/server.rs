//! Tracing initialization and server startup.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use memvault_api::{install_recorder, ApiServer, AppState, ServerSettings};
use memvault_config::{Config, LogFormat, LoggingConfig};

use crate::register::build_engine;

/// Initialize tracing from `[logging]`.
///
/// `RUST_LOG` overrides the configured level. With a log directory, a second
/// plain-text layer writes daily rotated files; keep the returned guard alive
/// until exit so buffered lines are flushed.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;

    let console = match logging.format {
        LogFormat::Json => fmt::layer().json().with_target(true).boxed(),
        LogFormat::Pretty => fmt::layer().with_target(true).with_ansi(true).boxed(),
    };

    let (file, guard) = match &logging.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("memvault")
                .filename_suffix("log")
                .max_log_files(30)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .try_init()?;

    Ok(guard)
}

/// Run the HTTP server until Ctrl-C or SIGTERM.
pub(crate) async fn run_server(config: Config) -> anyhow::Result<()> {
    info!("Starting memvault v{}", env!("CARGO_PKG_VERSION"));
    info!(database = %config.database.path.display(), "Opening structured store");

    let metrics = install_recorder().context("installing Prometheus recorder")?;
    let engine = build_engine(&config).await?;
    let state = Arc::new(AppState::new(Arc::new(engine)).with_metrics(metrics));

    let settings = ServerSettings::new(&config.server.host, config.server.port)
        .with_cors_origins(config.server.cors_origins.clone());
    let server = ApiServer::new(settings, state);

    server
        .run_until(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
