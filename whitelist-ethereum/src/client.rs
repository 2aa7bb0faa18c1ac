// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Debug;

use alloy::rpc::types::eth::request::{TransactionInput, TransactionRequest};
use alloy_primitives::{Address, Bytes, B256, U64};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::common::{EthereumQueryError, EthereumServiceError, RpcError};

/// Bounds shared by clients and wallet connectors. Browser handles are neither `Send` nor
/// `Sync`, so on the Web only `'static` is required.
#[cfg(web)]
pub trait AutoTraits: 'static {}
#[cfg(web)]
impl<T: 'static> AutoTraits for T {}

#[cfg(not(web))]
trait_set::trait_set! {
    /// Bounds shared by clients and wallet connectors: they move between Tokio tasks.
    pub trait AutoTraits = Send + Sync + 'static;
}

/// The only JSON-RPC version spoken by Ethereum providers.
pub const JSON_RPC_VERSION: &str = "2.0";

/// Serializes as an empty parameter list.
pub const NO_PARAMS: [u8; 0] = [];

#[derive(Serialize, Debug)]
pub struct JsonRpcRequest<'a, T> {
    id: u64,
    jsonrpc: &'a str,
    method: &'a str,
    params: T,
}

impl<'a, T> JsonRpcRequest<'a, T> {
    pub fn new(id: u64, method: &'a str, params: T) -> Self {
        Self {
            id,
            jsonrpc: JSON_RPC_VERSION,
            method,
            params,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct JsonRpcResponse {
    id: u64,
    jsonrpc: String,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// A client speaking JSON-RPC to an Ethereum provider. Implementors only move bytes
/// around; framing and checking the envelope is done by [`JsonRpcClient::request`].
#[cfg_attr(not(web), async_trait)]
#[cfg_attr(web, async_trait(?Send))]
pub trait JsonRpcClient: AutoTraits {
    /// Returns the id for the next request.
    async fn get_id(&self) -> u64;

    /// Sends a serialized request and returns the serialized response.
    async fn request_inner(&self, payload: Vec<u8>) -> Result<Vec<u8>, EthereumServiceError>;

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, EthereumServiceError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let id = self.get_id().await;
        tracing::trace!(id, method, ?params, "sending JSON-RPC request");
        let payload = JsonRpcRequest::new(id, method, params);
        let payload = serde_json::to_vec(&payload)?;
        let body = self.request_inner(payload).await?;
        let response = serde_json::from_slice::<JsonRpcResponse>(&body)?;
        if id != response.id {
            return Err(EthereumQueryError::IdIsNotMatching {
                expected: id,
                received: response.id,
            }
            .into());
        }
        if response.jsonrpc != JSON_RPC_VERSION {
            return Err(EthereumQueryError::WrongJsonRpcVersion(response.jsonrpc).into());
        }
        if let Some(error) = response.error {
            return Err(error.into());
        }
        let result = response.result.unwrap_or(serde_json::Value::Null);
        Ok(serde_json::from_value(result)?)
    }
}

/// The part of a transaction receipt the client cares about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// `1` for success, `0` for a reverted transaction. Missing on pre-Byzantium chains.
    #[serde(default)]
    pub status: Option<U64>,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        self.status.map_or(true, |status| status == U64::from(1))
    }
}

/// The Ethereum queries the whitelist client needs, built on any [`JsonRpcClient`].
#[cfg_attr(not(web), async_trait)]
#[cfg_attr(web, async_trait(?Send))]
pub trait EthereumQueries: JsonRpcClient {
    async fn get_chain_id(&self) -> Result<u64, EthereumServiceError> {
        let chain_id: U64 = self.request("eth_chainId", NO_PARAMS).await?;
        Ok(chain_id.to::<u64>())
    }

    async fn get_accounts(&self) -> Result<Vec<Address>, EthereumServiceError> {
        self.request("eth_accounts", NO_PARAMS).await
    }

    /// Asks the wallet to expose its accounts, prompting the user if needed.
    async fn request_accounts(&self) -> Result<Vec<Address>, EthereumServiceError> {
        self.request("eth_requestAccounts", NO_PARAMS).await
    }

    /// Runs a read-only call against the latest block.
    async fn non_executive_call(
        &self,
        contract_address: Address,
        data: Bytes,
        from: Option<Address>,
    ) -> Result<Bytes, EthereumServiceError> {
        let mut tx = TransactionRequest::default()
            .to(contract_address)
            .input(TransactionInput::both(data));
        if let Some(from) = from {
            tx = tx.from(from);
        }
        self.request("eth_call", (tx, "latest")).await
    }

    /// Asks the provider to sign and broadcast a transaction from `from`.
    async fn send_transaction(
        &self,
        contract_address: Address,
        data: Bytes,
        from: Address,
    ) -> Result<B256, EthereumServiceError> {
        let tx = TransactionRequest::default()
            .from(from)
            .to(contract_address)
            .input(TransactionInput::both(data));
        self.request("eth_sendTransaction", [tx]).await
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, EthereumServiceError> {
        self.request("eth_getTransactionReceipt", [tx_hash]).await
    }
}

impl<C: JsonRpcClient + ?Sized> EthereumQueries for C {}
