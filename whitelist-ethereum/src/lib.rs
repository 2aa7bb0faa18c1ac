// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module provides functionalities for talking to the whitelist contract through an
//! Ethereum JSON-RPC provider.

pub mod client;
pub mod common;
pub mod contract;
pub mod eip1193;
pub mod provider;
pub mod time;
pub mod wallet;

/// Helper types for tests.
#[cfg(with_testing)]
pub mod test_utils;
