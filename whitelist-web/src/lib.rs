// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
The whitelist page, driven from JavaScript.
 */

mod provider;

use std::{cell::RefCell, rc::Rc};

use alloy_primitives::Address;
use wasm_bindgen::prelude::*;
use whitelist_client::{
    controller::{CommandSender, ViewController},
    message::{Command, Operation},
    notifier::NotificationSink,
    options::ControllerOptions,
    render::View,
    Error,
};

pub use crate::provider::{Eip1193Provider, InjectedProvider, InjectedWalletConnector};

type JsResult<T> = Result<T, JsError>;

/// Shows alerts with `window.alert` and logs everything to the console.
struct BrowserSink;

impl NotificationSink for BrowserSink {
    fn alert(&self, message: &str) {
        let Some(window) = web_sys::window() else {
            tracing::warn!("{message}");
            return;
        };
        if let Err(error) = window.alert_with_message(message) {
            tracing::warn!(?error, "failed to show an alert: {message}");
        }
    }

    fn report(&self, operation: Operation, error: &Error) {
        tracing::error!(%operation, %error, "operation failed");
    }
}

type Listener = Rc<RefCell<Option<js_sys::Function>>>;

/// The whitelist page. Every method returns immediately; `onChange` tells when the view
/// changes.
#[wasm_bindgen]
pub struct WhitelistApp {
    commands: CommandSender,
    view: Rc<RefCell<View>>,
    listener: Listener,
}

#[wasm_bindgen]
impl WhitelistApp {
    /// Creates the page for the contract at `contract_address`. `options` may set
    /// `requiredChainId`, `confirmationPollIntervalMs` and `accountIndex`.
    ///
    /// # Errors
    /// If the address or the options are malformed.
    #[wasm_bindgen(constructor)]
    pub fn new(contract_address: &str, options: JsValue) -> JsResult<WhitelistApp> {
        let contract_address: Address = contract_address.parse()?;
        let (options, account_index) = if options.is_undefined() || options.is_null() {
            (ControllerOptions::default(), 0)
        } else {
            let account_index = serde_wasm_bindgen::from_value::<AccountIndex>(options.clone())?;
            (serde_wasm_bindgen::from_value(options)?, account_index.account_index)
        };

        let mut controller = ViewController::with_notifier(
            InjectedWalletConnector::new(account_index),
            contract_address,
            options,
            BrowserSink,
        );
        let commands = controller.commands();
        let view = Rc::new(RefCell::new(controller.view()));
        let listener = Listener::default();

        let (shared_view, shared_listener) = (view.clone(), listener.clone());
        wasm_bindgen_futures::spawn_local(async move {
            controller
                .run(|new_view| {
                    *shared_view.borrow_mut() = new_view.clone();
                    notify(&shared_listener, new_view);
                })
                .await;
        });

        Ok(WhitelistApp {
            commands,
            view,
            listener,
        })
    }

    /// Connects the wallet, as done when the page is first shown.
    pub fn mount(&self) {
        self.commands.send(Command::Connect);
    }

    pub fn connect(&self) {
        self.commands.send(Command::Connect);
    }

    pub fn join(&self) {
        self.commands.send(Command::Join);
    }

    pub fn refresh(&self) {
        self.commands.send(Command::Refresh);
    }

    /// The current view, as a plain object.
    ///
    /// # Errors
    /// If the view cannot be converted to a JavaScript value.
    pub fn view(&self) -> JsResult<JsValue> {
        Ok(serde_wasm_bindgen::to_value(&*self.view.borrow())?)
    }

    /// Calls `callback` with the new view after every change. Replaces the previous
    /// callback.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: js_sys::Function) {
        *self.listener.borrow_mut() = Some(callback);
    }
}

#[derive(Default, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AccountIndex {
    account_index: usize,
}

fn notify(listener: &Listener, view: &View) {
    let listener = listener.borrow();
    let Some(callback) = listener.as_ref() else {
        return;
    };
    let result = serde_wasm_bindgen::to_value(view)
        .map_err(JsValue::from)
        .and_then(|view| callback.call1(&JsValue::NULL, &view));
    if let Err(error) = result {
        tracing::warn!(?error, "the change listener failed");
    }
}

#[wasm_bindgen(start)]
pub fn main() {
    use tracing_subscriber::{
        prelude::__tracing_subscriber_SubscriberExt as _, util::SubscriberInitExt as _,
    };

    std::panic::set_hook(Box::new(console_error_panic_hook::hook));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .without_time()
                .with_writer(tracing_web::MakeWebConsoleWriter::new()),
        )
        .with(
            tracing_web::performance_layer()
                .with_details_from_fields(tracing_subscriber::fmt::format::Pretty::default()),
        )
        .init();
}
