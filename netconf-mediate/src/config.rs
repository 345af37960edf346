//! Plugin configuration discovery and service address resolution.
//!
//! The mediator and datastore addresses live in a shared `plugin.yaml`.
//! Rather than hard-coding file names at every call site, the search order
//! is an explicit [`ConfigPaths`] value: project-relative `.mediator/` first,
//! then the same pair under the user's home directory, then `/etc/mediator/`.
//! The first candidate that exists on disk is the configuration; later
//! candidates are never consulted, even when the first one is malformed.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Candidate file names searched relative to the working directory and the
/// user's home directory, highest precedence first.
const RELATIVE_CANDIDATES: [&str; 2] = [".mediator/plugin.yaml", ".mediator/plugin.yml"];

/// System-wide fallback candidates.
const SYSTEM_CANDIDATES: [&str; 2] = ["/etc/mediator/plugin.yaml", "/etc/mediator/plugin.yml"];

/// Ordered configuration file candidates.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    candidates: Vec<PathBuf>,
}

impl ConfigPaths {
    /// Standard search order: project-relative `.mediator/plugin.yaml` and
    /// `.mediator/plugin.yml`, the same pair under the home directory, then
    /// `/etc/mediator/`.
    pub fn standard() -> Self {
        let mut candidates: Vec<PathBuf> =
            RELATIVE_CANDIDATES.iter().map(PathBuf::from).collect();
        if let Some(home) = dirs::home_dir() {
            for name in RELATIVE_CANDIDATES {
                candidates.push(home.join(name));
            }
        }
        candidates.extend(SYSTEM_CANDIDATES.iter().map(PathBuf::from));
        Self { candidates }
    }

    /// Search exactly one explicitly chosen file.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            candidates: vec![path.into()],
        }
    }

    /// Search an explicit candidate list in order.
    pub fn from_candidates(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// Candidate files in precedence order.
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate that exists on disk.
    pub fn first_existing(&self) -> Option<&Path> {
        self.candidates
            .iter()
            .find(|path| path.is_file())
            .map(PathBuf::as_path)
    }
}

/// Errors raised while resolving service addresses from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No candidate configuration file exists.
    #[error("no mediator configuration found (searched {searched})")]
    NotFound { searched: String },
    /// Candidate file exists but could not be read.
    #[error("failed to read mediator configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Candidate file is not valid YAML.
    #[error("failed to parse mediator configuration {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    /// A required key is absent.
    #[error("mediator configuration {} is missing key '{key}'", path.display())]
    MissingKey { path: PathBuf, key: &'static str },
    /// A port value is not a valid TCP port number.
    #[error("mediator configuration {} has invalid port '{value}' for key '{key}'", path.display())]
    InvalidPort {
        path: PathBuf,
        key: &'static str,
        value: String,
    },
}

/// Resolved translation service address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediatorAddress {
    pub host: String,
    pub port: u16,
}

impl MediatorAddress {
    /// URL of the message translation endpoint.
    pub fn translate_url(&self) -> String {
        format!("http://{}:{}/v1/adaptor/translateMsg", self.host, self.port)
    }
}

/// Resolved datastore (controller) endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatastoreEndpoint {
    pub host: String,
    pub port: u16,
}

impl DatastoreEndpoint {
    /// URL of one datastore operation.
    pub fn operation_url(&self, operation: &str) -> String {
        format!(
            "http://{}:{}/v1/datastore/{}",
            self.host, self.port, operation
        )
    }
}

/// Raw shape of a `plugin.yaml` file. Every key is optional at parse time;
/// each resolver demands its own pair.
#[derive(Debug, Deserialize)]
struct PluginFile {
    mediator_host: Option<String>,
    mediator_port: Option<PortValue>,
    mediator_controller_host: Option<String>,
    mediator_controller_port: Option<PortValue>,
}

/// Port as written in YAML: a plain integer or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(i64),
    Text(String),
}

impl PortValue {
    fn port_number(&self) -> Option<u16> {
        match self {
            PortValue::Number(number) => u16::try_from(*number).ok(),
            PortValue::Text(text) => text.trim().parse().ok(),
        }
    }

    fn raw(&self) -> String {
        match self {
            PortValue::Number(number) => number.to_string(),
            PortValue::Text(text) => text.clone(),
        }
    }
}

/// Resolve the translation service address from the first existing candidate.
pub fn resolve_mediator_address(paths: &ConfigPaths) -> Result<MediatorAddress, ConfigError> {
    let (path, file) = load_plugin_file(paths)?;
    let host = file.mediator_host.ok_or_else(|| ConfigError::MissingKey {
        path: path.clone(),
        key: "mediator_host",
    })?;
    let port = require_port(&path, "mediator_port", file.mediator_port)?;
    Ok(MediatorAddress { host, port })
}

/// Resolve the datastore endpoint from the first existing candidate.
pub fn resolve_datastore_endpoint(paths: &ConfigPaths) -> Result<DatastoreEndpoint, ConfigError> {
    let (path, file) = load_plugin_file(paths)?;
    let host = file
        .mediator_controller_host
        .ok_or_else(|| ConfigError::MissingKey {
            path: path.clone(),
            key: "mediator_controller_host",
        })?;
    let port = require_port(
        &path,
        "mediator_controller_port",
        file.mediator_controller_port,
    )?;
    Ok(DatastoreEndpoint { host, port })
}

fn load_plugin_file(paths: &ConfigPaths) -> Result<(PathBuf, PluginFile), ConfigError> {
    let path = paths.first_existing().ok_or_else(|| ConfigError::NotFound {
        searched: paths
            .candidates()
            .iter()
            .map(|candidate| candidate.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })?;
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file = serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((path.to_path_buf(), file))
}

fn require_port(
    path: &Path,
    key: &'static str,
    value: Option<PortValue>,
) -> Result<u16, ConfigError> {
    let value = value.ok_or_else(|| ConfigError::MissingKey {
        path: path.to_path_buf(),
        key,
    })?;
    value.port_number().ok_or_else(|| ConfigError::InvalidPort {
        path: path.to_path_buf(),
        key,
        value: value.raw(),
    })
}
