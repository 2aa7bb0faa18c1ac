// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use whitelist_ethereum::common::EthereumServiceError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("wrong network: expected chain id {expected}, got {actual}")]
    WrongNetwork { expected: u64, actual: u64 },
    #[error("Ethereum error: {0}")]
    Ethereum(#[from] EthereumServiceError),
}
