// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use alloy_primitives::{Address, B256, U64};
use assert_matches::assert_matches;
use async_trait::async_trait;
use serde_json::json;
use whitelist_ethereum::{
    client::{EthereumQueries as _, JsonRpcClient, TransactionReceipt},
    common::{EthereumQueryError, EthereumServiceError, RpcError},
    contract::WhitelistContract,
    provider::HttpProvider,
    test_utils::{FakeNode, FakeWalletConnector, TEST_CHAIN_ID},
    wallet::{signer_address, HttpWalletConnector, WalletConnector as _},
};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

#[test_log::test(tokio::test)]
async fn test_chain_id_and_accounts() -> anyhow::Result<()> {
    let node = FakeNode::new(TEST_CHAIN_ID, 3);
    assert_eq!(node.get_chain_id().await?, TEST_CHAIN_ID);
    let accounts = node.request_accounts().await?;
    assert_eq!(accounts.len(), 3);
    assert_eq!(accounts[2], node.account(2));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_whitelist_queries() -> anyhow::Result<()> {
    let node = FakeNode::new(TEST_CHAIN_ID, 2);
    node.set_others_whitelisted(4);
    node.add_whitelisted(node.account(1));
    let contract = WhitelistContract::new(&node, FakeNode::CONTRACT_ADDRESS);

    assert_eq!(contract.num_addresses_whitelisted().await?, 5);
    assert!(!contract.whitelisted_addresses(node.account(0)).await?);
    assert!(contract.whitelisted_addresses(node.account(1)).await?);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_registration_is_confirmed() -> anyhow::Result<()> {
    let node = FakeNode::new(TEST_CHAIN_ID, 1);
    node.set_others_whitelisted(5);
    let account = node.account(0);
    let contract = WhitelistContract::new(&node, FakeNode::CONTRACT_ADDRESS);

    let pending = contract.add_address_to_whitelist(account).await?;
    let tx_hash = pending.tx_hash();
    let receipt = pending.wait(POLL_INTERVAL).await?;

    assert_eq!(receipt.transaction_hash, tx_hash);
    assert!(receipt.is_success());
    assert!(contract.whitelisted_addresses(account).await?);
    assert_eq!(contract.num_addresses_whitelisted().await?, 6);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_waiting_for_a_pending_transaction() -> anyhow::Result<()> {
    let node = FakeNode::new(TEST_CHAIN_ID, 1);
    node.set_auto_mine(false);
    let account = node.account(0);
    let contract = WhitelistContract::new(&node, FakeNode::CONTRACT_ADDRESS);

    let pending = contract.add_address_to_whitelist(account).await?;
    assert_eq!(node.pending_transactions(), 1);
    assert!(!node.is_whitelisted(account));

    let miner = node.clone();
    let (receipt, mined) = tokio::join!(pending.wait(POLL_INTERVAL), async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        miner.mine()
    });

    assert_eq!(mined, 1);
    assert!(receipt?.is_success());
    assert!(node.is_whitelisted(account));
    assert!(node.request_count("eth_getTransactionReceipt") >= 2);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_reverted_registration() -> anyhow::Result<()> {
    let node = FakeNode::new(TEST_CHAIN_ID, 1);
    node.revert_next_transaction();
    let account = node.account(0);
    let contract = WhitelistContract::new(&node, FakeNode::CONTRACT_ADDRESS);

    let pending = contract.add_address_to_whitelist(account).await?;
    let tx_hash = pending.tx_hash();
    assert_matches!(
        pending.wait(POLL_INTERVAL).await,
        Err(EthereumServiceError::TransactionReverted(hash)) if hash == tx_hash
    );
    assert!(!node.is_whitelisted(account));
    assert_eq!(node.num_whitelisted(), 0);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_registering_twice_reverts() -> anyhow::Result<()> {
    let node = FakeNode::new(TEST_CHAIN_ID, 1);
    let account = node.account(0);
    node.add_whitelisted(account);
    let contract = WhitelistContract::new(&node, FakeNode::CONTRACT_ADDRESS);

    let pending = contract.add_address_to_whitelist(account).await?;
    assert_matches!(
        pending.wait(POLL_INTERVAL).await,
        Err(EthereumServiceError::TransactionReverted(_))
    );
    assert_eq!(node.num_whitelisted(), 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_signer_address_falls_back_to_eth_accounts() -> anyhow::Result<()> {
    let node = FakeNode::new(TEST_CHAIN_ID, 2);
    node.remove_method("eth_requestAccounts");
    let connector = FakeWalletConnector {
        node: node.clone(),
        account_index: 1,
    };

    let client = connector.connect().await?;
    assert_eq!(connector.signer_address(&client).await?, node.account(1));
    assert_eq!(node.request_count("eth_requestAccounts"), 1);
    assert_eq!(node.request_count("eth_accounts"), 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_missing_account() {
    let node = FakeNode::new(TEST_CHAIN_ID, 1);
    assert_matches!(
        signer_address(&node, 3).await,
        Err(EthereumServiceError::MissingAccount(3))
    );
}

#[test_log::test(tokio::test)]
async fn test_rejected_connection() {
    let node = FakeNode::new(TEST_CHAIN_ID, 1);
    node.set_reject_connections(true);
    let connector = FakeWalletConnector::new(node.clone());
    assert_matches!(
        connector.connect().await,
        Err(EthereumServiceError::RpcError(RpcError { code: 4001, .. }))
    );
}

#[test_log::test(tokio::test)]
async fn test_rpc_errors_are_not_swallowed() {
    let node = FakeNode::new(TEST_CHAIN_ID, 1);
    node.fail_method("eth_call");
    let contract = WhitelistContract::new(&node, FakeNode::CONTRACT_ADDRESS);
    assert_matches!(
        contract.num_addresses_whitelisted().await,
        Err(EthereumServiceError::RpcError(RpcError { code: -32000, .. }))
    );

    node.restore_methods();
    assert_eq!(contract.num_addresses_whitelisted().await.unwrap(), 0);
}

#[test_log::test(tokio::test)]
async fn test_call_to_a_wrong_address_fails_to_decode() {
    let node = FakeNode::new(TEST_CHAIN_ID, 1);
    let contract = WhitelistContract::new(&node, Address::repeat_byte(0x42));
    assert_matches!(
        contract.num_addresses_whitelisted().await,
        Err(EthereumServiceError::AbiError(_))
    );
}

/// A provider answering every request with the same canned response.
struct CannedProvider(serde_json::Value);

#[async_trait]
impl JsonRpcClient for CannedProvider {
    async fn get_id(&self) -> u64 {
        1
    }

    async fn request_inner(&self, _payload: Vec<u8>) -> Result<Vec<u8>, EthereumServiceError> {
        Ok(serde_json::to_vec(&self.0)?)
    }
}

#[test_log::test(tokio::test)]
async fn test_mismatched_id_is_rejected() {
    let provider = CannedProvider(json!({"jsonrpc": "2.0", "id": 2, "result": "0x2328"}));
    assert_matches!(
        provider.get_chain_id().await,
        Err(EthereumServiceError::EthereumQueryError(
            EthereumQueryError::IdIsNotMatching {
                expected: 1,
                received: 2
            }
        ))
    );
}

#[test_log::test(tokio::test)]
async fn test_wrong_version_is_rejected() {
    let provider = CannedProvider(json!({"jsonrpc": "1.0", "id": 1, "result": "0x2328"}));
    assert_matches!(
        provider.get_chain_id().await,
        Err(EthereumServiceError::EthereumQueryError(
            EthereumQueryError::WrongJsonRpcVersion(version)
        )) if version == "1.0"
    );
}

#[test_log::test(tokio::test)]
async fn test_pending_receipt_is_none() -> anyhow::Result<()> {
    let provider = CannedProvider(json!({"jsonrpc": "2.0", "id": 1, "result": null}));
    let receipt = provider.get_transaction_receipt(B256::ZERO).await?;
    assert_eq!(receipt, None);
    Ok(())
}

#[test]
fn test_receipt_status() {
    let receipt: TransactionReceipt = serde_json::from_value(json!({
        "transactionHash": format!("0x{}", "11".repeat(32)),
        "blockNumber": "0x5",
        "status": "0x0",
        "logs": [],
    }))
    .unwrap();
    assert!(!receipt.is_success());
    assert_eq!(receipt.block_number, Some(U64::from(5)));

    let legacy: TransactionReceipt = serde_json::from_value(json!({
        "transactionHash": format!("0x{}", "11".repeat(32)),
        "blockNumber": "0x5",
    }))
    .unwrap();
    assert!(legacy.is_success());
}

#[test_log::test(tokio::test)]
async fn test_http_wallet_connector() -> anyhow::Result<()> {
    let connector = HttpWalletConnector::new("http://127.0.0.1:8545", 2);
    assert_eq!(connector.account_index(), 2);
    let provider = connector.connect().await?;
    assert_eq!(provider.url().as_str(), "http://127.0.0.1:8545/");

    let connector = HttpWalletConnector::new("not a url", 0);
    assert_matches!(
        connector.connect().await,
        Err(EthereumServiceError::UrlParseError(_))
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_unreachable_node() -> anyhow::Result<()> {
    let provider = HttpProvider::new("http://127.0.0.1:9")?;
    assert_matches!(
        provider.get_chain_id().await,
        Err(EthereumServiceError::ReqwestError(_))
    );
    Ok(())
}
