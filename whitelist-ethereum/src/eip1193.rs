// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Translation between JSON-RPC envelopes and the `request({ method, params })` calls of
//! an EIP-1193 provider, such as a browser wallet.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    client::JSON_RPC_VERSION,
    common::{EthereumServiceError, RpcError},
};

/// The single argument of an EIP-1193 `request` call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RequestArguments {
    pub method: String,
    pub params: Value,
}

#[derive(Deserialize)]
struct JsonRpcEnvelope {
    id: u64,
    method: String,
    #[serde(default)]
    params: Value,
}

/// Unwraps a serialized JSON-RPC request into its id and the arguments of the matching
/// `request` call.
pub fn request_arguments(
    payload: &[u8],
) -> Result<(u64, RequestArguments), EthereumServiceError> {
    let envelope: JsonRpcEnvelope = serde_json::from_slice(payload)?;
    let arguments = RequestArguments {
        method: envelope.method,
        params: envelope.params,
    };
    Ok((envelope.id, arguments))
}

/// Reads the value a provider rejected its promise with. Wallets reject with
/// `{ code, message }` objects; anything else means the provider itself is broken.
pub fn rejection(reason: Value) -> Result<RpcError, EthereumServiceError> {
    RpcError::deserialize(&reason)
        .map_err(|_| EthereumServiceError::ProviderUnavailable(reason.to_string()))
}

/// Wraps the outcome of a `request` call into the serialized JSON-RPC response for `id`.
pub fn response_payload(
    id: u64,
    outcome: Result<Value, RpcError>,
) -> Result<Vec<u8>, EthereumServiceError> {
    let response = match outcome {
        Ok(result) => json!({ "jsonrpc": JSON_RPC_VERSION, "id": id, "result": result }),
        Err(error) => json!({ "jsonrpc": JSON_RPC_VERSION, "id": id, "error": error }),
    };
    Ok(serde_json::to_vec(&response)?)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use alloy_primitives::Address;
    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;
    use crate::client::{EthereumQueries as _, JsonRpcClient, NO_PARAMS};

    /// A wallet answering `request` calls the way an injected provider does.
    struct Wallet {
        id: AtomicU64,
        answer: fn(&RequestArguments) -> Result<Value, Value>,
    }

    impl Wallet {
        fn new(answer: fn(&RequestArguments) -> Result<Value, Value>) -> Self {
            Self {
                id: AtomicU64::new(0),
                answer,
            }
        }
    }

    #[async_trait]
    impl JsonRpcClient for Wallet {
        async fn get_id(&self) -> u64 {
            self.id.fetch_add(1, Ordering::Relaxed) + 1
        }

        async fn request_inner(&self, payload: Vec<u8>) -> Result<Vec<u8>, EthereumServiceError> {
            let (id, arguments) = request_arguments(&payload)?;
            let outcome = match (self.answer)(&arguments) {
                Ok(result) => Ok(result),
                Err(reason) => Err(rejection(reason)?),
            };
            response_payload(id, outcome)
        }
    }

    fn chain_and_accounts(arguments: &RequestArguments) -> Result<Value, Value> {
        match arguments.method.as_str() {
            "eth_chainId" => Ok(json!("0x2328")),
            "eth_requestAccounts" => Ok(json!([Address::repeat_byte(1)])),
            _ => Err(json!({ "code": -32601, "message": "method not found" })),
        }
    }

    fn user_rejects(_: &RequestArguments) -> Result<Value, Value> {
        Err(json!({
            "code": 4001,
            "message": "User rejected the request.",
            "stack": "Error: User rejected the request.",
        }))
    }

    #[test]
    fn test_request_arguments() {
        let payload = br#"{"id":7,"jsonrpc":"2.0","method":"eth_call","params":[{"to":"0x00"},"latest"]}"#;
        let (id, arguments) = request_arguments(payload).unwrap();
        assert_eq!(id, 7);
        assert_eq!(arguments.method, "eth_call");
        assert_eq!(arguments.params, json!([{ "to": "0x00" }, "latest"]));
        assert_eq!(
            serde_json::to_value(&arguments).unwrap(),
            json!({ "method": "eth_call", "params": [{ "to": "0x00" }, "latest"] })
        );
    }

    #[test]
    fn test_malformed_request_is_a_json_error() {
        assert_matches!(
            request_arguments(b"{\"method\":\"eth_chainId\"}"),
            Err(EthereumServiceError::JsonError(_))
        );
    }

    #[test]
    fn test_response_payload() {
        let payload = response_payload(3, Ok(json!("0x1"))).unwrap();
        assert_eq!(
            serde_json::from_slice::<Value>(&payload).unwrap(),
            json!({ "jsonrpc": "2.0", "id": 3, "result": "0x1" })
        );
    }

    #[test]
    fn test_rejection_without_a_code() {
        assert_matches!(
            rejection(json!("the wallet is locked")),
            Err(EthereumServiceError::ProviderUnavailable(message)) if message.contains("locked")
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_queries_through_a_wallet() {
        let wallet = Wallet::new(chain_and_accounts);
        assert_eq!(wallet.get_chain_id().await.unwrap(), 9000);
        assert_eq!(
            wallet.request_accounts().await.unwrap(),
            [Address::repeat_byte(1)]
        );
        assert_eq!(wallet.id.load(Ordering::Relaxed), 2);
    }

    #[test_log::test(tokio::test)]
    async fn test_unknown_method_is_reported_as_such() {
        let wallet = Wallet::new(chain_and_accounts);
        let error = wallet
            .request::<_, Value>("eth_sign", NO_PARAMS)
            .await
            .unwrap_err();
        assert!(error.is_method_not_found());
    }

    #[test_log::test(tokio::test)]
    async fn test_rejected_request_is_an_rpc_error() {
        let wallet = Wallet::new(user_rejects);
        assert_matches!(
            wallet.request_accounts().await,
            Err(EthereumServiceError::RpcError(RpcError { code: 4001, message }))
                if message == "User rejected the request."
        );
    }
}
