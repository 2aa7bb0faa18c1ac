// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The wallet injected into the page by a browser extension.

use std::cell::Cell;

use async_trait::async_trait;
use serde::Serialize as _;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use whitelist_ethereum::{
    client::{EthereumQueries as _, JsonRpcClient},
    common::EthereumServiceError,
    eip1193::{rejection, request_arguments, response_payload},
    wallet::WalletConnector,
};

#[wasm_bindgen(typescript_custom_section)]
const EIP1193_PROVIDER_INTERFACE: &'static str = r#"
export interface Eip1193Provider {
  request(args: { method: string, params?: unknown[] }): Promise<unknown>;
}"#;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(typescript_type = "Eip1193Provider")]
    #[derive(Clone)]
    pub type Eip1193Provider;

    #[wasm_bindgen(catch, method)]
    async fn request(this: &Eip1193Provider, args: JsValue) -> Result<JsValue, JsValue>;
}

fn js_error(error: impl std::fmt::Display) -> EthereumServiceError {
    EthereumServiceError::ProviderUnavailable(error.to_string())
}

/// A JSON-RPC client forwarding every request to an EIP-1193 provider.
pub struct InjectedProvider {
    provider: Eip1193Provider,
    id: Cell<u64>,
}

impl InjectedProvider {
    pub fn new(provider: Eip1193Provider) -> Self {
        Self {
            provider,
            id: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl JsonRpcClient for InjectedProvider {
    async fn get_id(&self) -> u64 {
        let id = self.id.get() + 1;
        self.id.set(id);
        id
    }

    async fn request_inner(&self, payload: Vec<u8>) -> Result<Vec<u8>, EthereumServiceError> {
        let (id, arguments) = request_arguments(&payload)?;
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let arguments = arguments.serialize(&serializer).map_err(js_error)?;

        let outcome = match self.provider.request(arguments).await {
            Ok(result) => Ok(serde_wasm_bindgen::from_value::<Value>(result).map_err(js_error)?),
            Err(reason) => {
                let reason = serde_wasm_bindgen::from_value::<Value>(reason.clone())
                    .map_err(|_| js_error(format!("{reason:?}")))?;
                Err(rejection(reason)?)
            }
        };
        response_payload(id, outcome)
    }
}

/// Connects to `window.ethereum`.
#[derive(Clone, Debug, Default)]
pub struct InjectedWalletConnector {
    account_index: usize,
}

impl InjectedWalletConnector {
    pub fn new(account_index: usize) -> Self {
        Self { account_index }
    }

    fn injected_provider() -> Result<Eip1193Provider, EthereumServiceError> {
        let window = web_sys::window().ok_or_else(|| js_error("not running in a browser"))?;
        let ethereum = js_sys::Reflect::get(&window, &JsValue::from_str("ethereum"))
            .map_err(|error| js_error(format!("{error:?}")))?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return Err(js_error("no wallet found in the browser"));
        }
        Ok(ethereum.unchecked_into())
    }
}

#[async_trait(?Send)]
impl WalletConnector for InjectedWalletConnector {
    type Client = InjectedProvider;

    /// Asks the wallet for access to its accounts. The wallet prompts the user the first
    /// time only.
    async fn connect(&self) -> Result<InjectedProvider, EthereumServiceError> {
        let client = InjectedProvider::new(Self::injected_provider()?);
        client.request_accounts().await?;
        Ok(client)
    }

    fn account_index(&self) -> usize {
        self.account_index
    }
}
