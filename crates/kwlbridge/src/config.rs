//! Daemon configuration: TOML file merged with `KWL_`-prefixed
//! environment variables, with CLI flags taking priority over both.

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;

use kwlbridge_core::BridgeConfig;

use crate::cli::Cli;
use crate::error::CliError;

/// Values readable from the config file / environment.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub host: Option<String>,
    pub password: Option<String>,
    /// Recurring poll interval in seconds.
    pub interval: Option<u64>,
    /// Page identifiers for the recurring poll.
    pub pages: Option<Vec<u8>>,
}

/// Load the layered file/env configuration.
///
/// Without an explicit `--config`, a `kwlbridge.toml` in the working
/// directory is used if present; environment variables always apply.
pub fn load(path: Option<&Path>) -> Result<FileConfig, CliError> {
    let figment = match path {
        Some(p) => Figment::new().merge(Toml::file_exact(p)),
        None => Figment::new().merge(Toml::file("kwlbridge.toml")),
    };
    Ok(figment.merge(Env::prefixed("KWL_")).extract()?)
}

/// Combine file/env values and CLI flags into a `BridgeConfig`.
pub fn resolve(cli: &Cli, file: FileConfig) -> Result<BridgeConfig, CliError> {
    let host = cli
        .host
        .clone()
        .or(file.host)
        .ok_or_else(|| CliError::Missing("host"))?;
    let password = cli
        .password
        .clone()
        .or(file.password)
        .ok_or_else(|| CliError::Missing("password"))?;

    let mut config = BridgeConfig::new(host, password.into());
    if let Some(secs) = cli.interval.or(file.interval) {
        config.poll_interval = Duration::from_secs(secs);
    }
    config.update_pages = cli.pages.clone().or(file.pages);
    Ok(config)
}
