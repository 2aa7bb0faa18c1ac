// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Running operations in the background, natively or on the Web.
 */

use std::future::Future;

/// Starts `future` without waiting for it. Its result must be reported through a channel.
#[cfg(not(web))]
pub fn spawn<F: Future<Output = ()> + Send + 'static>(future: F) {
    tokio::task::spawn(future);
}

/// Starts `future` on the current thread without waiting for it. Its result must be
/// reported through a channel.
#[cfg(web)]
pub fn spawn<F: Future<Output = ()> + 'static>(future: F) {
    wasm_bindgen_futures::spawn_local(future);
}
