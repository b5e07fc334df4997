use anyhow::Context;
use datebook_client::{HttpTransport, Store};
use datebook_core::{AppConfig, DatebookError};
use std::path::Path;
use std::sync::Arc;

use crate::cli::Cli;

/// Everything a server-backed command needs.
pub struct CliContext {
    pub config: AppConfig,
    pub store: Arc<Store>,
}

impl CliContext {
    /// Resolve configuration from the file and the command line.
    pub fn config(cli: &Cli) -> anyhow::Result<AppConfig> {
        let config = match &cli.config {
            Some(path) => AppConfig::load_from(Path::new(path))
                .with_context(|| format!("Failed to load config from {path}"))?,
            None => AppConfig::load(),
        };
        Ok(match &cli.server {
            Some(server) => config.with_server_url(server.clone()),
            None => config,
        })
    }

    /// Build a signed-in store. Caches start empty; commands refresh what
    /// they need.
    pub fn connect(cli: &Cli) -> anyhow::Result<Self> {
        let token = cli
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(DatebookError::Unauthenticated)
            .context("Set --token or DATEBOOK_TOKEN")?;
        let config = Self::config(cli)?;
        let transport = HttpTransport::new(&config.server_url)?;
        tracing::debug!("Using server {}", transport.base_url());

        let store = Arc::new(Store::new(Arc::new(transport), &config));
        store.sign_in(token);
        Ok(Self { config, store })
    }
}
