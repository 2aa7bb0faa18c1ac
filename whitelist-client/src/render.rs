// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! What the page looks like for a given session state.

use std::fmt;

use serde::Serialize;

use crate::{
    message::Command,
    state::{Phase, SessionState},
};

pub const TITLE: &str = "NFT Celestia Whitelist";
pub const HEADING: &str = "Welcome to Celestia Blockchain";
pub const DESCRIPTION: &str = "It's an NFT collection for light node runner of project.";
pub const FOOTER: [&str; 2] = [
    "Made by duyvo102#3738 with \u{2764}\u{2764}\u{2764}",
    "Node Identity: 12D3KooWMTMwWoXW1HLWNNnS2wzGMYJ21hXLCgjS7TRFy1sYBvgo",
];

/// The single control shown under the description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Control {
    ConnectWallet,
    JoinWhitelist,
    Loading,
    Thanks,
}

impl Control {
    pub fn label(&self) -> &'static str {
        match self {
            Control::ConnectWallet => "Connect your wallet",
            Control::JoinWhitelist => "Join the Whitelist",
            Control::Loading => "Loading..",
            Control::Thanks => "Thanks for joining the Whitelist!",
        }
    }

    /// The command sent when the control is activated, if it can be.
    pub fn command(&self) -> Option<Command> {
        match self {
            Control::ConnectWallet => Some(Command::Connect),
            Control::JoinWhitelist => Some(Command::Join),
            Control::Loading | Control::Thanks => None,
        }
    }

    pub fn is_clickable(&self) -> bool {
        self.command().is_some()
    }
}

impl From<Phase> for Control {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Disconnected => Control::ConnectWallet,
            Phase::NotJoined => Control::JoinWhitelist,
            Phase::Loading => Control::Loading,
            Phase::Joined => Control::Thanks,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub title: &'static str,
    pub heading: &'static str,
    pub description: &'static str,
    pub joined_count: String,
    pub control: Control,
    pub control_label: &'static str,
    pub clickable: bool,
    pub footer: [&'static str; 2],
}

pub fn render(state: &SessionState) -> View {
    let control = Control::from(state.phase());
    View {
        title: TITLE,
        heading: HEADING,
        description: DESCRIPTION,
        joined_count: format!(
            "{} have already joined the Whitelist",
            state.number_of_whitelisted
        ),
        control,
        control_label: control.label(),
        clickable: control.is_clickable(),
        footer: FOOTER,
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.heading)?;
        writeln!(f, "{}", self.description)?;
        writeln!(f, "{}", self.joined_count)?;
        if self.clickable {
            writeln!(f, "[ {} ]", self.control_label)?;
        } else {
            writeln!(f, "{}", self.control_label)?;
        }
        write!(f, "\n{}", self.footer.join("\n"))
    }
}
