use std::time::Duration;

use anyhow::{Context, Result};
use netconf_envelope_core::envelope::MessageKind;
use netconf_mediate::diagnostics::DiagnosticsDir;
use netconf_mediate::translate::{ClientOptions, MediatorClient};

use crate::cli::{self, TranslateArgs};
use crate::payload_io;

pub fn run_translate(args: TranslateArgs) -> Result<()> {
    let message = payload_io::read_payload(&args.input)?;
    let kind = MessageKind::from(args.kind.as_str());
    let params = cli::target_params(
        args.params.as_deref(),
        args.host.as_deref(),
        args.provider_host.as_deref(),
    )?;

    let options = ClientOptions {
        config_paths: cli::config_paths(args.config.as_deref()),
        log_dir: args.log_dir.map(DiagnosticsDir::new),
        timeout: Duration::from_secs(args.timeout),
        ..ClientOptions::default()
    };
    let client = MediatorClient::new(options).context("failed to build mediator client")?;
    let translated = client
        .translate(&args.protocol, &kind, &params, &message)
        .with_context(|| format!("failed to translate {kind} message"))?;

    payload_io::emit_output(args.output.as_deref(), &translated)
}
