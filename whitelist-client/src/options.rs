// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_REQUIRED_CHAIN_ID: u64 = 9000;
pub const DEFAULT_CONFIRMATION_POLL_INTERVAL_MS: u64 = 1000;

/// How the view controller talks to the chain.
#[derive(Clone, Debug, PartialEq, Eq, clap::Args, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerOptions {
    /// The chain id the wallet must be connected to.
    #[arg(
        long,
        env = "WHITELIST_REQUIRED_CHAIN_ID",
        default_value_t = DEFAULT_REQUIRED_CHAIN_ID
    )]
    pub required_chain_id: u64,

    /// Delay between two polls for the receipt of the registration transaction, in
    /// milliseconds.
    #[arg(long, default_value_t = DEFAULT_CONFIRMATION_POLL_INTERVAL_MS)]
    pub confirmation_poll_interval_ms: u64,
}

impl ControllerOptions {
    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            required_chain_id: DEFAULT_REQUIRED_CHAIN_ID,
            confirmation_poll_interval_ms: DEFAULT_CONFIRMATION_POLL_INTERVAL_MS,
        }
    }
}
