//! Storefront edge proxy.
//!
//! ```text
//!   browser ──▶ /api/* ──▶ ┌──────────────────────────────┐ ──▶ upstream origin
//!                          │ prefix match → forward        │
//!   browser ◀──────────────│ Set-Cookie Domain stripped    │◀──
//!                          │ Content-Encoding/Length drop  │
//!                          └──────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use storefront_edge::config::{load_config, validate_config, BodyMode, ConfigError, ProxyConfig};
use storefront_edge::lifecycle::{signals, Shutdown};
use storefront_edge::observability::{logging, metrics};
use storefront_edge::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "storefront-edge")]
#[command(about = "Edge reverse proxy forwarding the storefront API prefix to its upstream", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the upstream origin.
    #[arg(long)]
    upstream: Option<String>,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Override the body strategy (buffered or streamed).
    #[arg(long)]
    body_mode: Option<BodyMode>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn load(&self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(upstream) = &self.upstream {
            config.upstream.origin = upstream.clone();
        }
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(mode) = self.body_mode {
            config.upstream.body_mode = mode;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load().context("invalid configuration")?;

    if cli.check {
        println!("configuration ok");
        return Ok(());
    }

    logging::init_logging(&config.observability).context("failed to initialize logging")?;
    tracing::info!("storefront-edge v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.origin,
        prefix = %config.upstream.path_prefix,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .context("invalid metrics address")?;
        metrics::init_metrics(addr).context("failed to start metrics endpoint")?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.listener.bind_address))?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config).context("failed to build proxy")?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
