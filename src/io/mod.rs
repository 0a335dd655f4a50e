mod http;

pub use http::HttpFetcher;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;

/// Trait for fetching a member's content from its URL
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Start a GET for `url`.
    ///
    /// Transport failures and non-2xx responses are errors; the caller
    /// treats them as a skipped member rather than a failed archive.
    async fn fetch(&self, url: &Url) -> Result<Box<dyn Body>>;
}

/// A response body read chunk by chunk
#[async_trait]
pub trait Body: Send {
    /// Next chunk, or `None` at the end of the body.
    async fn chunk(&mut self) -> std::io::Result<Option<Bytes>>;
}
