// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Where failed operations end up.

use tracing::{error, warn};

use crate::{message::Operation, Error};

/// Receives the failures of operations.
pub trait NotificationSink {
    /// Shows `message` to the user.
    fn alert(&self, message: &str);

    /// Records that `operation` failed, without bothering the user.
    fn report(&self, operation: Operation, error: &Error);

    fn notify(&self, operation: Operation, error: &Error) {
        if let Error::WrongNetwork { expected, .. } = error {
            self.alert(&format!("Change the network to chain {expected}"));
        }
        self.report(operation, error);
    }
}

/// Sends every notification to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn alert(&self, message: &str) {
        warn!("{message}");
    }

    fn report(&self, operation: Operation, error: &Error) {
        error!(%operation, %error, "operation failed");
    }
}
