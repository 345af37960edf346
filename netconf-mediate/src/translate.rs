//! Message translation through the mediator HTTP service.
//!
//! The client packs a payload fragment into a NETCONF envelope, POSTs it to
//! the mediator's translate endpoint and unpacks the answer. Translation is
//! best-effort: when the service is unreachable, times out or answers with a
//! non-200 status, the caller gets the original message back and a warning
//! is logged. Only configuration, target and envelope errors are fatal;
//! those indicate the call could never have produced a usable message.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use netconf_envelope_core::envelope::{self, EnvelopeError, MessageKind, PackOptions};

use crate::config::{resolve_mediator_address, ConfigError, ConfigPaths};
use crate::diagnostics::{DiagnosticsDir, Stage};
use crate::target::{resolve_target_id, MissingTarget, TargetParams};

/// Default bound on outbound HTTP calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Marker distinguishing structured replies from raw or error reply text.
const DATA_MARKER: &str = "<data";

/// Translation client construction options.
#[derive(Debug)]
pub struct ClientOptions {
    /// Configuration candidates used to resolve the mediator address.
    pub config_paths: ConfigPaths,
    /// Optional capture directory for per-stage diagnostics.
    pub log_dir: Option<DiagnosticsDir>,
    /// Envelope construction options.
    pub pack_options: PackOptions,
    /// Bound on each outbound HTTP call.
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            config_paths: ConfigPaths::standard(),
            log_dir: None,
            pack_options: PackOptions::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Errors that end a translation call.
///
/// An unreachable or refusing mediator is deliberately not in this set;
/// those cases fall back to the untranslated message.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Mediator address could not be resolved.
    #[error("failed to resolve mediator address: {0}")]
    Config(#[from] ConfigError),
    /// Module parameters carry no target element.
    #[error("failed to resolve target element: {0}")]
    MissingTarget(#[from] MissingTarget),
    /// Payload could not be packed, or a translated reply could not be
    /// unpacked.
    #[error("failed to process message envelope: {0}")]
    Envelope(#[from] EnvelopeError),
    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// JSON body of a translation request.
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    protocol: &'a str,
    neid: &'a str,
    message: &'a str,
}

/// Blocking client for the mediator translation service.
#[derive(Debug)]
pub struct MediatorClient {
    http: Client,
    options: ClientOptions,
}

impl MediatorClient {
    /// Build a client with the given options.
    pub fn new(options: ClientOptions) -> Result<Self, TranslateError> {
        let http = Client::builder().timeout(options.timeout).build()?;
        Ok(Self { http, options })
    }

    /// Translate one message for the target element.
    ///
    /// Messages of unrecognized kind pass through unchanged without touching
    /// configuration or the network, as do `rpc-reply` messages that carry
    /// no `<data>` element (raw command output, bare `<ok/>` replies).
    pub fn translate(
        &self,
        protocol: &str,
        kind: &MessageKind,
        params: &TargetParams,
        message: &str,
    ) -> Result<String, TranslateError> {
        if !kind.is_translatable() {
            debug!(
                kind = kind.as_str(),
                "message kind is not translatable, passing through"
            );
            return Ok(message.to_string());
        }
        if *kind == MessageKind::RpcReply && !message.contains(DATA_MARKER) {
            self.record(kind, Stage::RawMsg, message);
            debug!("rpc-reply carries no <data> element, passing through");
            return Ok(message.to_string());
        }

        self.record(kind, Stage::RawMsg, message);
        let envelope = envelope::pack_with_options(kind, message, &self.options.pack_options)?;
        self.record(kind, Stage::PackedMsg, &envelope);

        let neid = resolve_target_id(params)?;
        let address = resolve_mediator_address(&self.options.config_paths)?;
        let request = TranslateRequest {
            protocol,
            neid,
            message: &envelope,
        };

        let response = match self
            .http
            .post(address.translate_url())
            .json(&request)
            .send()
        {
            Ok(response) => response,
            Err(err) => {
                warn!(neid, "translation service unreachable, using untranslated message: {err}");
                return Ok(message.to_string());
            }
        };
        if response.status() != StatusCode::OK {
            warn!(
                neid,
                status = %response.status(),
                "translation service refused message, using untranslated message"
            );
            return Ok(message.to_string());
        }
        let translated = match response.text() {
            Ok(text) => text,
            Err(err) => {
                warn!(neid, "failed to read translation response, using untranslated message: {err}");
                return Ok(message.to_string());
            }
        };
        self.record(kind, Stage::TranslatedMsg, &translated);

        Ok(envelope::unpack(kind, &translated)?)
    }

    fn record(&self, kind: &MessageKind, stage: Stage, payload: &str) {
        if let Some(dir) = &self.options.log_dir {
            dir.record(kind, stage, payload);
        }
    }
}
