// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use async_lock::Mutex;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use url::Url;

use crate::{client::JsonRpcClient, common::EthereumServiceError};

/// An Ethereum node reached over HTTP.
#[derive(Debug)]
pub struct HttpProvider {
    url: Url,
    id: Mutex<u64>,
    client: Client,
}

#[cfg_attr(not(web), async_trait)]
#[cfg_attr(web, async_trait(?Send))]
impl JsonRpcClient for HttpProvider {
    async fn get_id(&self) -> u64 {
        let mut id = self.id.lock().await;
        *id += 1;
        *id
    }

    async fn request_inner(&self, payload: Vec<u8>) -> Result<Vec<u8>, EthereumServiceError> {
        let res = self
            .client
            .post(self.url.clone())
            .body(payload)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?
            .error_for_status()?;
        let body = res.bytes().await?;
        Ok(body.as_ref().to_vec())
    }
}

impl HttpProvider {
    /// Creates a client for the node at `url`. No request is made until the first query.
    pub fn new(url: &str) -> Result<Self, EthereumServiceError> {
        let url = Url::parse(url)?;
        let id = Mutex::new(0);
        Ok(Self {
            url,
            id,
            client: Client::new(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}
