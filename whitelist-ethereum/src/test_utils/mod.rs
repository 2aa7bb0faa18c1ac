// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! An in-memory Ethereum provider emulating a chain with the whitelist contract deployed.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard},
};

use alloy_primitives::{keccak256, Address, Bytes, B256, U256, U64};
use alloy_sol_types::SolCall as _;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    client::{JsonRpcClient, TransactionReceipt, JSON_RPC_VERSION},
    common::{EthereumServiceError, RpcError, METHOD_NOT_FOUND},
    contract::Whitelist,
    wallet::WalletConnector,
};

/// The chain id the client expects by default.
pub const TEST_CHAIN_ID: u64 = 9000;

const EXECUTION_REVERTED: i64 = 3;
const INVALID_PARAMS: i64 = -32602;
const SERVER_ERROR: i64 = -32000;
const USER_REJECTED: i64 = 4001;

#[derive(Debug, Default)]
struct FakeNodeState {
    chain_id: u64,
    accounts: Vec<Address>,
    whitelisted: BTreeSet<Address>,
    /// Whitelisted addresses that are not among `accounts`.
    others_whitelisted: u64,
    auto_mine: bool,
    revert_next: bool,
    reject_connections: bool,
    /// Submitted transactions: hash, sender, whether it reverts.
    pending: Vec<(B256, Address, bool)>,
    receipts: BTreeMap<B256, TransactionReceipt>,
    failing_methods: BTreeMap<String, i64>,
    nonce: u64,
    block_number: u64,
    requests: Vec<String>,
}

impl FakeNodeState {
    fn num_whitelisted(&self) -> u64 {
        self.whitelisted.len() as u64 + self.others_whitelisted
    }

    fn mine(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for (transaction_hash, from, reverts) in pending {
            self.block_number += 1;
            if !reverts {
                self.whitelisted.insert(from);
            }
            let receipt = TransactionReceipt {
                transaction_hash,
                block_number: Some(U64::from(self.block_number)),
                status: Some(U64::from(u64::from(!reverts))),
            };
            self.receipts.insert(transaction_hash, receipt);
        }
        count
    }

    fn handle(&mut self, method: &str, params: &Value) -> Result<Value, RpcError> {
        self.requests.push(method.to_string());
        if let Some(code) = self.failing_methods.get(method) {
            return Err(RpcError {
                code: *code,
                message: format!("{method} is not available"),
            });
        }
        match method {
            "eth_chainId" => Ok(json!(format!("{:#x}", self.chain_id))),
            "eth_accounts" => Ok(json!(self.accounts)),
            "eth_requestAccounts" => {
                if self.reject_connections {
                    return Err(user_rejected());
                }
                Ok(json!(self.accounts))
            }
            "eth_call" => {
                let (to, input) = parse_transaction(&params[0])?;
                self.call(to, &input)
            }
            "eth_sendTransaction" => {
                let (to, input) = parse_transaction(&params[0])?;
                let from = parse_param::<Address>(&params[0]["from"])?;
                self.send_transaction(from, to, &input)
            }
            "eth_getTransactionReceipt" => {
                let tx_hash = parse_param::<B256>(&params[0])?;
                Ok(json!(self.receipts.get(&tx_hash)))
            }
            _ => Err(RpcError {
                code: METHOD_NOT_FOUND,
                message: format!("the method {method} does not exist"),
            }),
        }
    }

    fn call(&self, to: Address, input: &[u8]) -> Result<Value, RpcError> {
        if to != FakeNode::CONTRACT_ADDRESS {
            return Ok(json!(Bytes::new()));
        }
        let word = match input.get(..4) {
            Some(selector) if selector == Whitelist::numAddressesWhitelistedCall::SELECTOR => {
                abi_word(self.num_whitelisted())
            }
            Some(selector) if selector == Whitelist::whitelistedAddressesCall::SELECTOR => {
                let argument = input.get(4..36).ok_or_else(invalid_params)?;
                let account = Address::from_word(B256::from_slice(argument));
                abi_word(u64::from(self.whitelisted.contains(&account)))
            }
            _ => return Err(execution_reverted()),
        };
        Ok(json!(word))
    }

    fn send_transaction(
        &mut self,
        from: Address,
        to: Address,
        input: &[u8],
    ) -> Result<Value, RpcError> {
        if !self.accounts.contains(&from) {
            return Err(RpcError {
                code: SERVER_ERROR,
                message: format!("unknown account {from}"),
            });
        }
        if to != FakeNode::CONTRACT_ADDRESS
            || input.get(..4) != Some(&Whitelist::addAddressToWhitelistCall::SELECTOR[..])
        {
            return Err(execution_reverted());
        }
        self.nonce += 1;
        let tx_hash = keccak256(self.nonce.to_be_bytes());
        // Mirrors `require(!whitelistedAddresses[msg.sender])` in the contract.
        let reverts = std::mem::take(&mut self.revert_next) || self.whitelisted.contains(&from);
        self.pending.push((tx_hash, from, reverts));
        if self.auto_mine {
            self.mine();
        }
        Ok(json!(tx_hash))
    }
}

fn parse_param<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, RpcError> {
    serde_json::from_value(value.clone()).map_err(|_| invalid_params())
}

fn parse_transaction(tx: &Value) -> Result<(Address, Bytes), RpcError> {
    let to = parse_param::<Address>(&tx["to"])?;
    let input = tx
        .get("input")
        .or_else(|| tx.get("data"))
        .ok_or_else(invalid_params)?;
    Ok((to, parse_param::<Bytes>(input)?))
}

fn abi_word(value: u64) -> Bytes {
    Bytes::copy_from_slice(&U256::from(value).to_be_bytes::<32>())
}

fn invalid_params() -> RpcError {
    RpcError {
        code: INVALID_PARAMS,
        message: "invalid params".to_string(),
    }
}

fn user_rejected() -> RpcError {
    RpcError {
        code: USER_REJECTED,
        message: "User rejected the request.".to_string(),
    }
}

fn execution_reverted() -> RpcError {
    RpcError {
        code: EXECUTION_REVERTED,
        message: "execution reverted".to_string(),
    }
}

/// A fake Ethereum node. Clones share the same chain.
#[derive(Clone, Debug)]
pub struct FakeNode {
    state: Arc<Mutex<FakeNodeState>>,
    id: Arc<async_lock::Mutex<u64>>,
}

impl FakeNode {
    /// Where the whitelist contract is deployed.
    pub const CONTRACT_ADDRESS: Address = Address::repeat_byte(0xc0);

    /// Creates a chain with `num_accounts` unlocked accounts. Transactions are mined as
    /// soon as they are submitted.
    pub fn new(chain_id: u64, num_accounts: u8) -> Self {
        let state = FakeNodeState {
            chain_id,
            accounts: (1..=num_accounts).map(Address::with_last_byte).collect(),
            auto_mine: true,
            ..FakeNodeState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            id: Arc::new(async_lock::Mutex::new(0)),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeNodeState> {
        self.state.lock().expect("fake node state poisoned")
    }

    pub fn account(&self, index: usize) -> Address {
        self.state().accounts[index]
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        self.state().chain_id = chain_id;
    }

    /// Pretends that `count` addresses outside of this node's accounts already joined.
    pub fn set_others_whitelisted(&self, count: u64) {
        self.state().others_whitelisted = count;
    }

    pub fn add_whitelisted(&self, address: Address) {
        self.state().whitelisted.insert(address);
    }

    pub fn is_whitelisted(&self, address: Address) -> bool {
        self.state().whitelisted.contains(&address)
    }

    pub fn num_whitelisted(&self) -> u64 {
        self.state().num_whitelisted()
    }

    /// When disabled, transactions stay pending until [`FakeNode::mine`] is called.
    pub fn set_auto_mine(&self, auto_mine: bool) {
        self.state().auto_mine = auto_mine;
    }

    /// Mines every pending transaction and returns how many there were.
    pub fn mine(&self) -> usize {
        self.state().mine()
    }

    pub fn pending_transactions(&self) -> usize {
        self.state().pending.len()
    }

    /// Makes the next submitted transaction revert.
    pub fn revert_next_transaction(&self) {
        self.state().revert_next = true;
    }

    /// Makes connecting fail as if the user dismissed the wallet prompt.
    pub fn set_reject_connections(&self, reject: bool) {
        self.state().reject_connections = reject;
    }

    /// Makes every call to `method` fail with a server error.
    pub fn fail_method(&self, method: &str) {
        self.state()
            .failing_methods
            .insert(method.to_string(), SERVER_ERROR);
    }

    /// Makes `method` unknown to the node.
    pub fn remove_method(&self, method: &str) {
        self.state()
            .failing_methods
            .insert(method.to_string(), METHOD_NOT_FOUND);
    }

    /// Undoes [`FakeNode::fail_method`] and [`FakeNode::remove_method`].
    pub fn restore_methods(&self) {
        self.state().failing_methods.clear();
    }

    /// How many times `method` was requested.
    pub fn request_count(&self, method: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|request| *request == method)
            .count()
    }
}

#[cfg_attr(not(web), async_trait)]
#[cfg_attr(web, async_trait(?Send))]
impl JsonRpcClient for FakeNode {
    async fn get_id(&self) -> u64 {
        let mut id = self.id.lock().await;
        *id += 1;
        *id
    }

    async fn request_inner(&self, payload: Vec<u8>) -> Result<Vec<u8>, EthereumServiceError> {
        let request: Value = serde_json::from_slice(&payload)?;
        let method = request["method"].as_str().unwrap_or_default();
        let outcome = self.state().handle(method, &request["params"]);
        let response = match outcome {
            Ok(result) => json!({
                "jsonrpc": JSON_RPC_VERSION,
                "id": request["id"],
                "result": result,
            }),
            Err(error) => json!({
                "jsonrpc": JSON_RPC_VERSION,
                "id": request["id"],
                "error": error,
            }),
        };
        Ok(serde_json::to_vec(&response)?)
    }
}

/// A wallet connector handing out connections to a [`FakeNode`].
#[derive(Clone, Debug)]
pub struct FakeWalletConnector {
    pub node: FakeNode,
    pub account_index: usize,
}

impl FakeWalletConnector {
    pub fn new(node: FakeNode) -> Self {
        Self {
            node,
            account_index: 0,
        }
    }
}

#[cfg_attr(not(web), async_trait)]
#[cfg_attr(web, async_trait(?Send))]
impl WalletConnector for FakeWalletConnector {
    type Client = FakeNode;

    async fn connect(&self) -> Result<FakeNode, EthereumServiceError> {
        if self.node.state().reject_connections {
            return Err(user_rejected().into());
        }
        Ok(self.node.clone())
    }

    fn account_index(&self) -> usize {
        self.account_index
    }
}
