use std::time::Duration;

use anyhow::{Context, Result};
use netconf_mediate::datastore::{DatastoreClient, NotifyStatus};

use crate::cli::{self, NotifyArgs};
use crate::payload_io;

pub fn run_notify(args: NotifyArgs) -> Result<()> {
    let data = payload_io::read_payload(&args.input)?;
    let params = cli::target_params(
        args.params.as_deref(),
        args.host.as_deref(),
        args.provider_host.as_deref(),
    )?;
    let paths = cli::config_paths(args.config.as_deref());

    let client = DatastoreClient::from_paths(&paths, Duration::from_secs(args.timeout))
        .context("failed to build datastore client")?;
    let status = client
        .notify(args.operation.to_domain(), &params, &args.module, &data)
        .context("failed to push datastore notification")?;

    match status {
        NotifyStatus::Accepted => println!("status=accepted"),
        NotifyStatus::Unavailable => println!("status=unavailable"),
    }
    Ok(())
}
