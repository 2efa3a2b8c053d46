//! Argument resolution shared across CLI commands.

use std::time::Duration;

use clap::Args;
use coordsync::config::ConfigFile;
use coordsync::coord::{parse_coordinate, Srs};
use coordsync::transform::{AsyncReqwestClient, RemoteTransformService};

use crate::error::CliError;

/// The production transformation service.
pub type ReqwestTransformService = RemoteTransformService<AsyncReqwestClient>;

/// Transformation service options.
#[derive(Debug, Clone, Default, Args)]
pub struct ServiceArgs {
    /// Transformation service URL (overrides service.url)
    #[arg(long, value_name = "URL")]
    pub service_url: Option<String>,

    /// Request timeout in seconds (overrides service.timeout)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Resolve the transformation service from CLI args and config.
pub fn resolve_service(
    args: &ServiceArgs,
    config: &ConfigFile,
) -> Result<ReqwestTransformService, CliError> {
    // CLI takes precedence, then config
    let url = args
        .service_url
        .clone()
        .unwrap_or_else(|| config.service.url.clone());
    let timeout_secs = args.timeout.unwrap_or(config.service.timeout_secs);

    let http_client = AsyncReqwestClient::with_timeout(Duration::from_secs(timeout_secs))?;
    Ok(RemoteTransformService::new(&url, http_client)?)
}

/// Resolve the projected SRS from CLI args and config.
pub fn resolve_srs(cli_srs: Option<&str>, config: &ConfigFile) -> Result<Srs, CliError> {
    match cli_srs {
        Some(srs) => Ok(srs.parse()?),
        None => Ok(config.sync.srs.clone()),
    }
}

/// Parse a coordinate argument, naming it in the error.
pub fn parse_number(name: &str, text: &str) -> Result<f64, CliError> {
    parse_coordinate(text)
        .ok_or_else(|| CliError::Input(format!("{} must be a number, got '{}'", name, text)))
}
