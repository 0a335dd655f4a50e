use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response, Url};
use std::io;
use std::time::Duration;

use super::{Body, Fetch};
use anyhow::{Result, bail};

/// HTTP fetcher for member URLs
///
/// Only the connection phase is bounded; bodies may take as long as the
/// downstream consumer needs to drain them.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    /// Use a preconfigured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Box<dyn Body>> {
        let resp = self.client.get(url.clone()).send().await?;

        if !resp.status().is_success() {
            bail!("HTTP request failed with status: {}", resp.status());
        }

        Ok(Box::new(HttpBody { response: resp }))
    }
}

struct HttpBody {
    response: Response,
}

#[async_trait]
impl Body for HttpBody {
    async fn chunk(&mut self) -> io::Result<Option<Bytes>> {
        self.response.chunk().await.map_err(io::Error::other)
    }
}
