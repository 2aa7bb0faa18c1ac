// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The inputs and outputs of [`crate::state::update`].

use std::fmt;

use alloy_primitives::B256;

use crate::Error;

/// A request from the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Connect the wallet, if it is not connected yet.
    Connect,
    /// Add the signer to the whitelist.
    Join,
    /// Read the number of whitelisted addresses again.
    Refresh,
}

/// Something that happened to the session.
#[derive(Debug)]
pub enum Message {
    Command(Command),
    Connected(Result<(), Error>),
    MembershipChecked(Result<bool, Error>),
    CountFetched(Result<u64, Error>),
    /// The registration transaction was accepted by the wallet, or refused.
    RegistrationSubmitted(Result<B256, Error>),
    /// The registration transaction was mined, or it failed.
    RegistrationConfirmed(Result<(), Error>),
}

impl Message {
    /// Whether this is the last message sent by the task running an operation.
    pub fn ends_operation(&self) -> bool {
        match self {
            Message::Command(_) => false,
            Message::RegistrationSubmitted(result) => result.is_err(),
            Message::Connected(_)
            | Message::MembershipChecked(_)
            | Message::CountFetched(_)
            | Message::RegistrationConfirmed(_) => true,
        }
    }
}

/// An external call made on behalf of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Connect,
    CheckMembership,
    RefreshCount,
    Register,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Connect => "connect",
            Operation::CheckMembership => "check_membership",
            Operation::RefreshCount => "refresh_count",
            Operation::Register => "register",
        };
        f.write_str(name)
    }
}

/// What [`crate::state::update`] asks the controller to do.
#[derive(Debug)]
pub enum Effect {
    /// Start `operation` in a new task.
    Run(Operation),
    /// Tell the user or the log that `operation` failed.
    Notify(Operation, Error),
}
