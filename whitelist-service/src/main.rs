// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The `whitelist` binary: the whitelist page, in a terminal.

mod input;
mod logging;
mod options;

use std::num::NonZeroUsize;

use anyhow::Context as _;
use clap::Parser as _;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Instrument as _};
use whitelist_client::{
    controller::{CommandSender, ViewController},
    render::View,
};
use whitelist_ethereum::wallet::HttpWalletConnector;

use crate::{
    input::{Input, HELP},
    options::ServiceOptions,
};

fn main() -> anyhow::Result<()> {
    let options = ServiceOptions::parse();

    logging::init("whitelist")?;

    let mut runtime = if options.tokio_threads.map(NonZeroUsize::get) == Some(1) {
        tokio::runtime::Builder::new_current_thread()
    } else {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        if let Some(threads) = options.tokio_threads {
            builder.worker_threads(threads.get());
        }
        builder
    };

    let span = tracing::info_span!("whitelist::main", contract = %options.contract_address);
    let runtime = runtime
        .enable_all()
        .build()
        .context("failed to create the Tokio runtime")?;
    let result = runtime.block_on(run(options).instrument(span));
    // A pending read of stdin must not keep the process alive.
    runtime.shutdown_background();
    result
}

async fn run(options: ServiceOptions) -> anyhow::Result<()> {
    let connector = HttpWalletConnector::new(options.rpc_url, options.account_index);
    info!(rpc_url = %connector.url(), "starting");
    let mut controller =
        ViewController::new(connector, options.contract_address, options.controller);

    let shutdown = CancellationToken::new();
    tokio::spawn(listen_for_shutdown_signals(shutdown.clone()));
    tokio::spawn(read_commands(controller.commands(), shutdown.clone()));

    print_view(&controller.view());
    controller.mount();
    tokio::select! {
        () = controller.run(print_view) => {}
        () = shutdown.cancelled() => info!("shutting down"),
    }
    Ok(())
}

fn print_view(view: &View) {
    println!("\n{view}\n");
}

/// Forwards the commands typed on stdin until `quit` or the end of the input.
async fn read_commands(commands: CommandSender, shutdown: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                error!(%error, "failed to read from stdin");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Input>() {
            Ok(Input::Command(command)) => commands.send(command),
            Ok(Input::Help) => println!("{HELP}"),
            Ok(Input::Quit) => break,
            Err(error) => eprintln!("{error}"),
        }
    }
    shutdown.cancel();
}

/// Cancels `shutdown` on Ctrl-C.
async fn listen_for_shutdown_signals(shutdown: CancellationToken) {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for Ctrl-C");
        return;
    }
    shutdown.cancel();
}
