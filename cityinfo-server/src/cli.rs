use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use cityinfo_core::{Config, server};
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityinfo", version, about = "City info gateway")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bind host; overrides HOST and the config file.
    #[arg(long)]
    pub host: Option<String>,

    /// Listening port; overrides PORT and the config file.
    #[arg(long)]
    pub port: Option<u16>,

    /// Log filter used when RUST_LOG is unset, e.g. "debug" or "cityinfo_core=trace".
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let dotenv = dotenvy::dotenv();
        let config = self.resolve_config()?;

        init_tracing(config.log_level.as_deref());

        match dotenv {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(err) if err.not_found() => {}
            Err(err) => warn!(error = %err, "failed to load .env"),
        }
        if config.api_key.is_none() {
            warn!("API_KEY is not set; upstream requests will be sent without a key");
        }

        let hook = server::ready_hook_from_config(&config);
        server::run(&config, hook.as_ref()).await.inspect_err(|err| error!("{err:#}"))
    }

    /// Defaults, then config file, then environment, then flags.
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        config.apply_env()?;
        self.apply_flags(&mut config);

        Ok(config)
    }

    fn apply_flags(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(level) = &self.log_level {
            config.log_level = Some(level.clone());
        }
    }
}

fn init_tracing(fallback: Option<&str>) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(fallback.unwrap_or("info"))),
        )
        .init();
}
