use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use netconf_envelope_core::envelope::DefaultOperation;
use netconf_mediate::config::ConfigPaths;
use netconf_mediate::datastore::NotifyOperation;
use netconf_mediate::target::{ProviderParams, TargetParams};

#[derive(Parser, Debug)]
#[command(name = "netconf-mediate")]
#[command(about = "Pack, translate and push NETCONF payloads through a mediator service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Wrap a payload fragment in a NETCONF envelope.
    Pack(PackArgs),
    /// Extract the payload fragment from a NETCONF envelope.
    Unpack(UnpackArgs),
    /// Translate a payload through the mediator service.
    Translate(TranslateArgs),
    /// Push configuration state to the datastore service.
    Notify(NotifyArgs),
    /// Show the resolved mediator and datastore addresses.
    Resolve(ResolveArgs),
}

#[derive(Parser, Debug)]
pub struct PackArgs {
    /// Message kind (edit-config, get-config, get, rpc-reply).
    pub kind: String,
    /// Payload file, or `-` for stdin.
    pub input: PathBuf,
    /// default-operation child for edit-config envelopes.
    #[arg(long, value_enum, default_value_t = DefaultOperationArg::Merge, conflicts_with = "no_default_operation")]
    pub default_operation: DefaultOperationArg,
    /// Omit the default-operation child entirely.
    #[arg(long)]
    pub no_default_operation: bool,
    /// Output file (stdout if omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct UnpackArgs {
    /// Message kind (edit-config, get-config, get, rpc-reply).
    pub kind: String,
    /// Envelope file, or `-` for stdin.
    pub input: PathBuf,
    /// Output file (stdout if omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct TranslateArgs {
    /// Message kind; unrecognized kinds pass through unchanged.
    pub kind: String,
    /// Payload file, or `-` for stdin.
    pub input: PathBuf,
    /// Protocol name sent to the mediator.
    #[arg(long, default_value = "netconf")]
    pub protocol: String,
    /// Target element address.
    #[arg(long, conflicts_with = "params")]
    pub host: Option<String>,
    /// Provider-supplied fallback address.
    #[arg(long, conflicts_with = "params")]
    pub provider_host: Option<String>,
    /// Module parameters as JSON (host and provider.host are read from it).
    #[arg(long)]
    pub params: Option<String>,
    /// Explicit configuration file (skips the standard search).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Capture raw/packed/translated messages under this directory.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
    /// Output file (stdout if omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct NotifyArgs {
    /// Datastore operation.
    #[arg(value_enum)]
    pub operation: NotifyOperationArg,
    /// Configuration payload file, or `-` for stdin.
    pub input: PathBuf,
    /// Module name reported to the datastore.
    #[arg(long)]
    pub module: String,
    /// Target element address.
    #[arg(long, conflicts_with = "params")]
    pub host: Option<String>,
    /// Provider-supplied fallback address.
    #[arg(long, conflicts_with = "params")]
    pub provider_host: Option<String>,
    /// Module parameters as JSON (host and provider.host are read from it).
    #[arg(long)]
    pub params: Option<String>,
    /// Explicit configuration file (skips the standard search).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Explicit configuration file (skips the standard search).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// CLI values for the NETCONF default-operation.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DefaultOperationArg {
    Merge,
    Replace,
    None,
}

impl DefaultOperationArg {
    pub fn to_domain(self) -> DefaultOperation {
        match self {
            DefaultOperationArg::Merge => DefaultOperation::Merge,
            DefaultOperationArg::Replace => DefaultOperation::Replace,
            DefaultOperationArg::None => DefaultOperation::None,
        }
    }
}

/// CLI values for datastore operations.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum NotifyOperationArg {
    SetControllerConfig,
    SetDeviceConfig,
    UpdateControllerConfig,
    UpdateDeviceConfig,
}

impl NotifyOperationArg {
    pub fn to_domain(self) -> NotifyOperation {
        match self {
            NotifyOperationArg::SetControllerConfig => NotifyOperation::SetControllerConfig,
            NotifyOperationArg::SetDeviceConfig => NotifyOperation::SetDeviceConfig,
            NotifyOperationArg::UpdateControllerConfig => NotifyOperation::UpdateControllerConfig,
            NotifyOperationArg::UpdateDeviceConfig => NotifyOperation::UpdateDeviceConfig,
        }
    }
}

/// Explicit file when given, standard search order otherwise.
pub fn config_paths(config: Option<&Path>) -> ConfigPaths {
    match config {
        Some(path) => ConfigPaths::single(path),
        None => ConfigPaths::standard(),
    }
}

/// Target parameters from `--params` JSON or the `--host`/`--provider-host`
/// pair.
pub fn target_params(
    params: Option<&str>,
    host: Option<&str>,
    provider_host: Option<&str>,
) -> Result<TargetParams> {
    if let Some(json) = params {
        return serde_json::from_str(json).context("failed to parse --params JSON");
    }
    if host.is_none() && provider_host.is_none() {
        bail!("one of --host, --provider-host or --params is required");
    }
    Ok(TargetParams {
        host: host.map(str::to_string),
        provider: provider_host.map(|provider_host| ProviderParams {
            host: Some(provider_host.to_string()),
        }),
    })
}
