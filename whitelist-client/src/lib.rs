// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The view controller of the whitelist client.
//!
//! The session state only changes through [`state::update`], which turns each
//! [`message::Message`] into a new state and a list of [`message::Effect`]s. Every external
//! call runs as its own task whose result comes back as a message.

pub mod controller;
mod error;
pub mod message;
pub mod notifier;
pub mod options;
pub mod render;
pub mod state;
pub mod task;

pub use error::Error;
