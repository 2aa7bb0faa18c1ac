// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The clock used while waiting for a transaction: Tokio's timer natively, the browser's
//! timer on the Web.

cfg_if::cfg_if! {
    if #[cfg(web)] {
        pub use wasmtimer::tokio::sleep;
        pub use web_time::Duration;
    } else {
        pub use std::time::Duration;
        pub use tokio::time::sleep;
    }
}
