//! Network element identification from caller-supplied module parameters.

use serde::Deserialize;
use thiserror::Error;

/// Addressing subset of a module parameter object.
///
/// Callers hand over whole parameter maps; everything beyond `host` and
/// `provider.host` is ignored during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetParams {
    /// Direct network element address.
    #[serde(default)]
    pub host: Option<String>,
    /// Provider block carrying the connection address.
    #[serde(default)]
    pub provider: Option<ProviderParams>,
}

impl TargetParams {
    /// Parameters that address the element directly by host.
    pub fn from_host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            provider: None,
        }
    }
}

/// The `provider` sub-object of module parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderParams {
    #[serde(default)]
    pub host: Option<String>,
}

/// Neither `host` nor `provider.host` was supplied.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("neither host nor provider.host is set in module parameters")]
pub struct MissingTarget;

/// Network element identifier: `host` when set, else `provider.host`.
pub fn resolve_target_id(params: &TargetParams) -> Result<&str, MissingTarget> {
    params
        .host
        .as_deref()
        .or_else(|| {
            params
                .provider
                .as_ref()
                .and_then(|provider| provider.host.as_deref())
        })
        .ok_or(MissingTarget)
}
