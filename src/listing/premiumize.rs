use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{EntryKind, FolderLister, Listing, ListingEntry};

/// Folder listing endpoint used when none is configured.
pub const DEFAULT_API_URL: &str = "https://www.premiumize.me/api/folder/list";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    content: Vec<ApiItem>,
}

#[derive(Debug, Deserialize)]
struct ApiItem {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    directlink: Option<String>,
    #[serde(default)]
    size: Option<u64>,
}

/// Lists folders through the Premiumize.me `folder/list` API
pub struct PremiumizeLister {
    client: Client,
    api_url: String,
    api_key: String,
}

impl PremiumizeLister {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Use a preconfigured client
    pub fn with_client(
        client: Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl FolderLister for PremiumizeLister {
    async fn list(&self, path: &str) -> Result<Listing> {
        let resp = self
            .client
            .get(&self.api_url)
            .query(&[("apikey", self.api_key.as_str()), ("path", path)])
            .send()
            .await?;

        if !resp.status().is_success() {
            bail!("folder listing failed with status: {}", resp.status());
        }

        let body: ApiResponse = resp.json().await?;
        if body.status != "success" {
            bail!(
                "folder listing returned status {:?}: {}",
                body.status,
                body.message.unwrap_or_default()
            );
        }

        let entries = body
            .content
            .into_iter()
            .filter_map(|item| {
                let kind = match item.kind.as_str() {
                    "file" => EntryKind::File,
                    "folder" => EntryKind::Folder,
                    _ => return None,
                };
                Some(ListingEntry {
                    name: item.name,
                    kind,
                    fetch_url: item.directlink,
                    size: item.size,
                })
            })
            .collect();

        Ok(Listing {
            name: body.name,
            entries,
        })
    }
}
