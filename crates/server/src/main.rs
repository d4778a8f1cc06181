//! Registry tag index server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use regindex_core::config::AppConfig;
use regindex_server::{AppState, create_router};
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// regindexd - a searchable tag index fed by registry notifications
#[derive(Parser, Debug)]
#[command(name = "regindexd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "REGINDEX_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

/// Load configuration from an optional TOML file overlaid with
/// `REGINDEX_`-prefixed environment variables (`__` separates sections).
fn load_config(config_path: &Path) -> Result<AppConfig> {
    let mut figment = Figment::new();

    if config_path.exists() {
        tracing::info!(config_path = %config_path.display(), "Loading configuration from file");
        figment = figment.merge(Toml::file(config_path));
    } else {
        tracing::debug!(
            "No config file found at {}, using defaults and environment",
            config_path.display()
        );
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("REGINDEX_").ignore(&["config"]).split("__"))
        .extract()
        .context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("regindexd v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(Path::new(&args.config))?;

    if config.server.metrics_enabled {
        regindex_server::metrics::register_metrics();
        tracing::info!("Prometheus metrics registered");
    }

    // The database lives under the registry's storage root
    let catalog = regindex_catalog::from_config(&config)
        .await
        .context("failed to open index database")?;
    catalog
        .health_check()
        .await
        .context("index database health check failed")?;
    tracing::info!(
        path = %config.index.database_path(&config.storage).display(),
        "Catalog store initialized"
    );

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    let state = AppState::new(config, catalog);
    let sink = state.sink.clone();
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sink.close().await.context("failed to close index sink")?;
    tracing::info!("Index sink closed");

    Ok(())
}
