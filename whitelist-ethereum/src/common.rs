// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The JSON-RPC error code for a method the provider does not implement.
pub const METHOD_NOT_FOUND: i64 = -32601;

#[derive(Error, Debug)]
pub enum EthereumQueryError {
    /// The id should be matching
    #[error("the response id {received} does not match the request id {expected}")]
    IdIsNotMatching { expected: u64, received: u64 },

    /// wrong jsonrpc version
    #[error("wrong jsonrpc version {0:?}")]
    WrongJsonRpcVersion(String),
}

/// An error object returned by the provider in place of a result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("RPC error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum EthereumServiceError {
    /// The provider broke the JSON-RPC protocol.
    #[error(transparent)]
    EthereumQueryError(#[from] EthereumQueryError),

    /// The provider answered with an error object.
    #[error(transparent)]
    RpcError(#[from] RpcError),

    /// `serde_json` error
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// ABI decoding error
    #[error(transparent)]
    AbiError(#[from] alloy_sol_types::Error),

    /// URL parsing error
    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),

    /// HTTP transport error
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error("the provider does not expose an account at index {0}")]
    MissingAccount(usize),

    #[error("transaction {0} was reverted")]
    TransactionReverted(B256),

    /// The provider could not be reached at all, e.g. no injected wallet.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl EthereumServiceError {
    /// Returns `true` if the provider reported that it does not implement the method.
    pub fn is_method_not_found(&self) -> bool {
        matches!(self, EthereumServiceError::RpcError(error) if error.code == METHOD_NOT_FOUND)
    }
}
