// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Obtaining a provider handle and a signing account from a wallet.

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::{
    client::{AutoTraits, EthereumQueries as _, JsonRpcClient},
    common::EthereumServiceError,
    provider::HttpProvider,
};

/// Something that can hand out a connection to the user's wallet.
#[cfg_attr(not(web), async_trait)]
#[cfg_attr(web, async_trait(?Send))]
pub trait WalletConnector: AutoTraits {
    type Client: JsonRpcClient;

    /// Connects to the wallet, prompting the user if the wallet requires it.
    async fn connect(&self) -> Result<Self::Client, EthereumServiceError>;

    /// The position of the signing account among the accounts exposed by the wallet.
    fn account_index(&self) -> usize {
        0
    }

    /// Returns the address of the account that signs transactions.
    async fn signer_address(&self, client: &Self::Client) -> Result<Address, EthereumServiceError> {
        signer_address(client, self.account_index()).await
    }
}

/// Returns the account at `index`. Wallets that do not know `eth_requestAccounts`, such as
/// plain nodes, are asked for `eth_accounts` instead.
pub async fn signer_address<C>(client: &C, index: usize) -> Result<Address, EthereumServiceError>
where
    C: JsonRpcClient + ?Sized,
{
    let accounts = match client.request_accounts().await {
        Err(error) if error.is_method_not_found() => client.get_accounts().await?,
        result => result?,
    };
    accounts
        .get(index)
        .copied()
        .ok_or(EthereumServiceError::MissingAccount(index))
}

/// A wallet living in an Ethereum node with unlocked accounts, reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpWalletConnector {
    url: String,
    account_index: usize,
}

impl HttpWalletConnector {
    pub fn new(url: impl Into<String>, account_index: usize) -> Self {
        Self {
            url: url.into(),
            account_index,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg_attr(not(web), async_trait)]
#[cfg_attr(web, async_trait(?Send))]
impl WalletConnector for HttpWalletConnector {
    type Client = HttpProvider;

    async fn connect(&self) -> Result<HttpProvider, EthereumServiceError> {
        HttpProvider::new(&self.url)
    }

    fn account_index(&self) -> usize {
        self.account_index
    }
}
