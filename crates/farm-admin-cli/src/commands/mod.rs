mod report;

use anyhow::Result;

use farm_admin_sdk::dispatch::{Command, Config, Dispatcher};
use farm_admin_sdk::gateway::Gateway;
use farm_admin_sdk::{AdminError, SigningIdentity};

use crate::output;
use crate::terminal::{self, Terminal};

pub async fn run(config: &Config, command: Command, phrase: Option<String>) -> Result<()> {
    // metadata and offline checks first, nothing below runs on a bad input
    let mut dispatcher = Dispatcher::new(config);
    dispatcher.prepare(&command).map_err(with_hint)?;

    let identity = if command.needs_signer() {
        let phrase = terminal::read_phrase(phrase)?;
        Some(SigningIdentity::from_phrase(&phrase)?)
    } else {
        None
    };

    let pb = output::spinner(&format!("connecting to {}", config.endpoint));
    let connected = Gateway::connect(config.endpoint.clone()).await;
    pb.finish_and_clear();
    let mut gateway = connected.map_err(with_hint)?;
    output::label("chain", gateway.chain_name());

    let report = dispatcher
        .run(&mut gateway, &mut Terminal, &command, identity.as_ref())
        .await
        .map_err(with_hint)?;

    report::render(&report);
    Ok(())
}

fn with_hint(err: AdminError) -> anyhow::Error {
    let hint = match &err {
        AdminError::MetadataNotFound(_) => {
            "build the contract with `cargo contract build` or point --farm-metadata, \
             --psp22-metadata or --wrapped-metadata at its .json"
        }
        AdminError::ConnectionError(_) => "is the node running? check --chain",
        AdminError::InvalidAddress(_) => "addresses must use the connected chain's SS58 prefix",
        AdminError::MissingAddress(_) => "pass the wAZERO contract with --address",
        AdminError::ScheduleError(_) => {
            "each reward must be 0 or at least (end - start); pass one --rewards value per --tokens"
        }
        AdminError::UnsupportedRuntime(_) => {
            "the node's runtime has no usable Contracts pallet; check --chain"
        }
        _ => return err.into(),
    };
    output::fail_with_hint(err, hint)
}
