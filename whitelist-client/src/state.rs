// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The session state and the only function allowed to change it.

use serde::Serialize;
use tracing::debug;

use crate::message::{Command, Effect, Message, Operation};

#[cfg(test)]
#[path = "unit_tests/state_tests.rs"]
mod state_tests;

/// Everything the page shows about the session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub wallet_connected: bool,
    pub joined_whitelist: bool,
    /// A registration transaction was submitted and is not confirmed yet.
    pub loading: bool,
    pub number_of_whitelisted: u64,
    /// A registration was requested and the wallet has not answered yet.
    #[serde(skip)]
    pub submitting: bool,
    /// A connection was requested and the wallet has not answered yet.
    #[serde(skip)]
    pub connecting: bool,
}

/// Which control the page offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    NotJoined,
    Loading,
    Joined,
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        if !self.wallet_connected {
            Phase::Disconnected
        } else if self.joined_whitelist {
            Phase::Joined
        } else if self.loading {
            Phase::Loading
        } else {
            Phase::NotJoined
        }
    }

    fn can_join(&self) -> bool {
        self.wallet_connected && !self.joined_whitelist && !self.loading && !self.submitting
    }
}

/// Applies `message` to `state` and returns what must happen next.
pub fn update(state: &mut SessionState, message: Message) -> Vec<Effect> {
    match message {
        Message::Command(Command::Connect) => {
            if state.wallet_connected || state.connecting {
                debug!(?state, "ignoring request to connect the wallet");
                return Vec::new();
            }
            state.connecting = true;
            vec![Effect::Run(Operation::Connect)]
        }
        Message::Command(Command::Join) => {
            if !state.can_join() {
                debug!(?state, "ignoring request to join the whitelist");
                return Vec::new();
            }
            state.submitting = true;
            vec![Effect::Run(Operation::Register)]
        }
        Message::Command(Command::Refresh) => vec![Effect::Run(Operation::RefreshCount)],

        Message::Connected(Ok(())) => {
            state.connecting = false;
            state.wallet_connected = true;
            vec![
                Effect::Run(Operation::CheckMembership),
                Effect::Run(Operation::RefreshCount),
            ]
        }
        Message::Connected(Err(error)) => {
            state.connecting = false;
            vec![Effect::Notify(Operation::Connect, error)]
        }

        // A registration confirmed earlier wins over a read that raced with it.
        Message::MembershipChecked(Ok(joined)) => {
            state.joined_whitelist |= joined;
            Vec::new()
        }
        Message::MembershipChecked(Err(error)) => {
            vec![Effect::Notify(Operation::CheckMembership, error)]
        }

        Message::CountFetched(Ok(count)) => {
            state.number_of_whitelisted = count;
            Vec::new()
        }
        Message::CountFetched(Err(error)) => vec![Effect::Notify(Operation::RefreshCount, error)],

        Message::RegistrationSubmitted(Ok(tx_hash)) => {
            debug!(%tx_hash, "waiting for the registration to be mined");
            state.submitting = false;
            state.loading = true;
            Vec::new()
        }
        Message::RegistrationSubmitted(Err(error)) => {
            state.submitting = false;
            vec![Effect::Notify(Operation::Register, error)]
        }

        Message::RegistrationConfirmed(Ok(())) => {
            state.loading = false;
            state.joined_whitelist = true;
            vec![Effect::Run(Operation::RefreshCount)]
        }
        // `loading` stays set: the page keeps showing the pending registration.
        Message::RegistrationConfirmed(Err(error)) => {
            vec![Effect::Notify(Operation::Register, error)]
        }
    }
}
