// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::num::NonZeroUsize;

use alloy_primitives::Address;
use whitelist_client::options::ControllerOptions;

#[derive(Clone, Debug, clap::Parser)]
#[command(
    name = "whitelist",
    version,
    about = "Joins the NFT Celestia whitelist from the terminal"
)]
pub struct ServiceOptions {
    /// The JSON-RPC endpoint of an Ethereum node holding the signing account.
    #[arg(long, env = "WHITELIST_RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,

    /// The address of the whitelist contract.
    #[arg(long, env = "WHITELIST_CONTRACT_ADDRESS")]
    pub contract_address: Address,

    /// Which of the node's accounts signs the registration.
    #[arg(long, default_value = "0")]
    pub account_index: usize,

    /// The number of Tokio worker threads to use.
    #[arg(long, env = "WHITELIST_TOKIO_THREADS")]
    pub tokio_threads: Option<NonZeroUsize>,

    #[command(flatten)]
    pub controller: ControllerOptions,
}
