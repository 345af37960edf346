use anyhow::{Context, Result};
use clap::Parser;
use netconf_envelope_core::envelope::{self, MessageKind, PackOptions};
use netconf_mediate::config::{resolve_datastore_endpoint, resolve_mediator_address};
use tracing_subscriber::EnvFilter;

mod cli;
mod notify_cmd;
mod payload_io;
mod translate_cmd;

use cli::{Cli, Command, PackArgs, ResolveArgs, UnpackArgs};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Pack(args) => run_pack(args),
        Command::Unpack(args) => run_unpack(args),
        Command::Translate(args) => translate_cmd::run_translate(args),
        Command::Notify(args) => notify_cmd::run_notify(args),
        Command::Resolve(args) => run_resolve(args),
    }
}

fn run_pack(args: PackArgs) -> Result<()> {
    let fragment = payload_io::read_payload(&args.input)?;
    let kind = MessageKind::from(args.kind.as_str());
    let envelope = envelope::pack_with_options(&kind, &fragment, &pack_options(&args))
        .with_context(|| format!("failed to pack {kind} payload"))?;
    payload_io::emit_output(args.output.as_deref(), &envelope)
}

fn run_unpack(args: UnpackArgs) -> Result<()> {
    let envelope_text = payload_io::read_payload(&args.input)?;
    let kind = MessageKind::from(args.kind.as_str());
    let fragment = envelope::unpack(&kind, &envelope_text)
        .with_context(|| format!("failed to unpack {kind} envelope"))?;
    payload_io::emit_output(args.output.as_deref(), &fragment)
}

fn run_resolve(args: ResolveArgs) -> Result<()> {
    let paths = cli::config_paths(args.config.as_deref());
    let source = paths
        .first_existing()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "none".to_string());
    let mediator =
        resolve_mediator_address(&paths).context("failed to resolve mediator address")?;
    let datastore =
        resolve_datastore_endpoint(&paths).context("failed to resolve datastore endpoint")?;

    println!("config={source}");
    println!("mediator=http://{}:{}", mediator.host, mediator.port);
    println!("datastore=http://{}:{}", datastore.host, datastore.port);
    Ok(())
}

fn pack_options(args: &PackArgs) -> PackOptions {
    if args.no_default_operation {
        PackOptions {
            default_operation: None,
        }
    } else {
        PackOptions {
            default_operation: Some(args.default_operation.to_domain()),
        }
    }
}
