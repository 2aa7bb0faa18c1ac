// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Typed access to the whitelist contract.

use alloy_primitives::{Address, B256};
use alloy_sol_types::{sol, SolCall};
use tracing::{debug, instrument};

use crate::{
    client::{EthereumQueries, JsonRpcClient, TransactionReceipt},
    common::EthereumServiceError,
    time::{sleep, Duration},
};

sol! {
    /// The interface of the deployed whitelist contract.
    interface Whitelist {
        function addAddressToWhitelist() external;
        function numAddressesWhitelisted() external view returns (uint8);
        function whitelistedAddresses(address account) external view returns (bool);
    }
}

/// The whitelist contract at a fixed address, seen through a provider.
pub struct WhitelistContract<'a, C: ?Sized> {
    client: &'a C,
    address: Address,
}

impl<'a, C> WhitelistContract<'a, C>
where
    C: JsonRpcClient + ?Sized,
{
    pub fn new(client: &'a C, address: Address) -> Self {
        Self { client, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Reads the number of whitelisted addresses.
    #[instrument(level = "debug", skip(self), fields(contract = %self.address))]
    pub async fn num_addresses_whitelisted(&self) -> Result<u64, EthereumServiceError> {
        let data = Whitelist::numAddressesWhitelistedCall {}.abi_encode();
        let answer = self
            .client
            .non_executive_call(self.address, data.into(), None)
            .await?;
        let count = Whitelist::numAddressesWhitelistedCall::abi_decode_returns(&answer)?;
        Ok(u64::from(count))
    }

    /// Reads whether `account` is in the whitelist.
    #[instrument(level = "debug", skip(self), fields(contract = %self.address))]
    pub async fn whitelisted_addresses(
        &self,
        account: Address,
    ) -> Result<bool, EthereumServiceError> {
        let data = Whitelist::whitelistedAddressesCall { account }.abi_encode();
        let answer = self
            .client
            .non_executive_call(self.address, data.into(), Some(account))
            .await?;
        Ok(Whitelist::whitelistedAddressesCall::abi_decode_returns(&answer)?)
    }

    /// Submits the registration of `from`. The returned transaction still has to be
    /// confirmed.
    #[instrument(level = "debug", skip(self), fields(contract = %self.address))]
    pub async fn add_address_to_whitelist(
        &self,
        from: Address,
    ) -> Result<PendingTransaction<'a, C>, EthereumServiceError> {
        let data = Whitelist::addAddressToWhitelistCall {}.abi_encode();
        let tx_hash = self
            .client
            .send_transaction(self.address, data.into(), from)
            .await?;
        debug!(%tx_hash, "registration submitted");
        Ok(PendingTransaction {
            client: self.client,
            tx_hash,
        })
    }
}

/// A transaction accepted by the provider but not necessarily mined yet.
pub struct PendingTransaction<'a, C: ?Sized> {
    client: &'a C,
    tx_hash: B256,
}

impl<C> PendingTransaction<'_, C>
where
    C: JsonRpcClient + ?Sized,
{
    pub fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    /// Polls for the receipt every `poll_interval` until the transaction is mined. There
    /// is no timeout. A reverted transaction is an error.
    pub async fn wait(
        self,
        poll_interval: Duration,
    ) -> Result<TransactionReceipt, EthereumServiceError> {
        loop {
            if let Some(receipt) = self.client.get_transaction_receipt(self.tx_hash).await? {
                if !receipt.is_success() {
                    return Err(EthereumServiceError::TransactionReverted(self.tx_hash));
                }
                debug!(
                    tx_hash = %self.tx_hash,
                    block_number = ?receipt.block_number,
                    "transaction confirmed"
                );
                return Ok(receipt);
            }
            sleep(poll_interval).await;
        }
    }
}
