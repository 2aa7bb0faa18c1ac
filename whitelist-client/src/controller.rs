// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Runs the operations requested by [`update`] and feeds their results back into it.

use std::sync::Arc;

use alloy_primitives::Address;
use futures::{channel::mpsc, StreamExt as _};
use tracing::{debug, instrument};
use whitelist_ethereum::{
    client::EthereumQueries as _,
    contract::{PendingTransaction, WhitelistContract},
    wallet::WalletConnector,
};

use crate::{
    message::{Command, Effect, Message, Operation},
    notifier::{NotificationSink, TracingSink},
    options::ControllerOptions,
    render::{render, View},
    state::{update, SessionState},
    task, Error,
};

#[cfg(test)]
#[path = "unit_tests/controller_tests.rs"]
mod controller_tests;

pub type MessageSender = mpsc::UnboundedSender<Message>;

fn send(messages: &MessageSender, message: Message) {
    if messages.unbounded_send(message).is_err() {
        debug!("the view controller was dropped");
    }
}

/// The wallet and the contract, as seen by one session.
pub struct ControllerContext<W> {
    connector: W,
    contract_address: Address,
    options: ControllerOptions,
}

impl<W: WalletConnector> ControllerContext<W> {
    pub fn new(connector: W, contract_address: Address, options: ControllerOptions) -> Self {
        Self {
            connector,
            contract_address,
            options,
        }
    }

    pub fn connector(&self) -> &W {
        &self.connector
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Connects to the wallet and checks that it is on the required chain.
    pub async fn provider(&self) -> Result<W::Client, Error> {
        let client = self.connector.connect().await?;
        let actual = client.get_chain_id().await?;
        let expected = self.options.required_chain_id;
        if actual != expected {
            return Err(Error::WrongNetwork { expected, actual });
        }
        Ok(client)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn connect(&self) -> Result<(), Error> {
        self.provider().await?;
        Ok(())
    }

    /// Returns whether the signing account is whitelisted.
    #[instrument(level = "debug", skip(self))]
    pub async fn check_membership(&self) -> Result<bool, Error> {
        let client = self.provider().await?;
        let account = self.connector.signer_address(&client).await?;
        let contract = WhitelistContract::new(&client, self.contract_address);
        Ok(contract.whitelisted_addresses(account).await?)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn refresh_count(&self) -> Result<u64, Error> {
        let client = self.provider().await?;
        let contract = WhitelistContract::new(&client, self.contract_address);
        Ok(contract.num_addresses_whitelisted().await?)
    }

    async fn submit_registration<'a>(
        &self,
        client: &'a W::Client,
    ) -> Result<PendingTransaction<'a, W::Client>, Error> {
        let from = self.connector.signer_address(client).await?;
        let contract = WhitelistContract::new(client, self.contract_address);
        Ok(contract.add_address_to_whitelist(from).await?)
    }

    /// Registers the signing account. Sends [`Message::RegistrationSubmitted`], then
    /// [`Message::RegistrationConfirmed`] if the submission went through.
    #[instrument(level = "debug", skip_all)]
    pub async fn register(&self, messages: &MessageSender) {
        let client = match self.provider().await {
            Ok(client) => client,
            Err(error) => return send(messages, Message::RegistrationSubmitted(Err(error))),
        };
        let pending = match self.submit_registration(&client).await {
            Ok(pending) => pending,
            Err(error) => return send(messages, Message::RegistrationSubmitted(Err(error))),
        };
        send(messages, Message::RegistrationSubmitted(Ok(pending.tx_hash())));
        let confirmed = pending
            .wait(self.options.confirmation_poll_interval())
            .await
            .map(|_| ())
            .map_err(Error::from);
        send(messages, Message::RegistrationConfirmed(confirmed));
    }

    async fn run(&self, operation: Operation, messages: MessageSender) {
        let message = match operation {
            Operation::Connect => Message::Connected(self.connect().await),
            Operation::CheckMembership => {
                Message::MembershipChecked(self.check_membership().await)
            }
            Operation::RefreshCount => Message::CountFetched(self.refresh_count().await),
            Operation::Register => return self.register(&messages).await,
        };
        send(&messages, message);
    }
}

/// Sends commands to a [`ViewController`] from elsewhere, e.g. a UI event handler.
#[derive(Clone)]
pub struct CommandSender(MessageSender);

impl CommandSender {
    pub fn send(&self, command: Command) {
        send(&self.0, Message::Command(command));
    }
}

/// Owns the session state of one page.
pub struct ViewController<W, N = TracingSink> {
    context: Arc<ControllerContext<W>>,
    notifier: N,
    state: SessionState,
    sender: MessageSender,
    receiver: mpsc::UnboundedReceiver<Message>,
    /// Operations started and not finished yet.
    running: usize,
}

impl<W: WalletConnector> ViewController<W> {
    pub fn new(connector: W, contract_address: Address, options: ControllerOptions) -> Self {
        Self::with_notifier(connector, contract_address, options, TracingSink)
    }
}

impl<W, N> ViewController<W, N>
where
    W: WalletConnector,
    N: NotificationSink,
{
    pub fn with_notifier(
        connector: W,
        contract_address: Address,
        options: ControllerOptions,
        notifier: N,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded();
        Self {
            context: Arc::new(ControllerContext::new(connector, contract_address, options)),
            notifier,
            state: SessionState::default(),
            sender,
            receiver,
            running: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> View {
        render(&self.state)
    }

    pub fn context(&self) -> &ControllerContext<W> {
        &self.context
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn commands(&self) -> CommandSender {
        CommandSender(self.sender.clone())
    }

    pub fn running_operations(&self) -> usize {
        self.running
    }

    /// Connects the wallet when the page is first shown.
    pub fn mount(&mut self) {
        self.dispatch(Command::Connect);
    }

    pub fn dispatch(&mut self, command: Command) {
        self.handle(Message::Command(command));
    }

    /// Applies `message` to the state and carries out the resulting effects.
    pub fn handle(&mut self, message: Message) {
        if message.ends_operation() {
            self.running = self.running.saturating_sub(1);
        }
        for effect in update(&mut self.state, message) {
            match effect {
                Effect::Run(operation) => self.start(operation),
                Effect::Notify(operation, error) => self.notifier.notify(operation, &error),
            }
        }
    }

    fn start(&mut self, operation: Operation) {
        debug!(%operation, "starting operation");
        self.running += 1;
        let context = self.context.clone();
        let messages = self.sender.clone();
        task::spawn(async move { context.run(operation, messages).await });
    }

    /// Handles the next message of a running operation. Returns `false` when nothing is
    /// running.
    pub async fn step(&mut self) -> bool {
        if self.running == 0 {
            return false;
        }
        match self.receiver.next().await {
            Some(message) => {
                self.handle(message);
                true
            }
            None => false,
        }
    }

    /// Handles messages until every running operation has finished.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    /// Handles messages until `condition` holds. Returns `false` if every operation
    /// finished first.
    pub async fn run_until(&mut self, condition: impl Fn(&SessionState) -> bool) -> bool {
        loop {
            if condition(&self.state) {
                return true;
            }
            if !self.step().await {
                return false;
            }
        }
    }

    /// Handles messages forever, including the commands of every [`CommandSender`], and
    /// calls `on_change` whenever the view changes.
    pub async fn run(&mut self, mut on_change: impl FnMut(&View)) {
        let mut view = self.view();
        while let Some(message) = self.receiver.next().await {
            self.handle(message);
            let new_view = self.view();
            if new_view != view {
                on_change(&new_view);
                view = new_view;
            }
        }
    }
}
