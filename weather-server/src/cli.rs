use std::{net::Ipv4Addr, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use weather_core::Config;

use crate::{logging, routes};

/// Top-level CLI struct. Flags and environment variables override the config
/// file.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather aggregation HTTP server")]
pub struct Cli {
    /// OpenWeather API key.
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Port to listen on.
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Verbose logging.
    #[arg(long, env = "WEATHER_DEBUG")]
    pub debug: bool,

    /// Seconds to keep provider responses; 0 disables caching.
    #[arg(long, env = "WEATHER_CACHE_TTL_SECS")]
    pub cache_ttl_secs: Option<u64>,

    /// Config file; defaults to the platform config directory.
    #[arg(long, env = "WEATHER_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.resolve_config()?;
        logging::init(config.debug)?;

        let state = routes::AppState::from_config(&config);
        let app = routes::router(state);

        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port))
            .await
            .with_context(|| format!("Failed to bind to port {}", config.port))?;
        tracing::info!(port = config.port, "weather server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server terminated unexpectedly")?;

        Ok(())
    }

    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        if let Some(api_key) = &self.api_key {
            config.api_key = Some(api_key.clone());
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(ttl) = self.cache_ttl_secs {
            config.cache_ttl_secs = ttl;
        }
        config.debug |= self.debug;

        Ok(config)
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
