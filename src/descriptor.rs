//! Manifest parsing.
//!
//! A manifest is a JSON object naming the download and listing its entries:
//!
//! ```json
//! { "suggestedFilename": "photos", "files": [
//!     { "url": "https://cdn.example.com/a.jpg", "zipPath": "photos/a.jpg", "size": 1024 },
//!     { "zipPath": "photos/empty/" } ] }
//! ```
//!
//! Entries are parsed best-effort: one bad entry is dropped and the rest
//! still make an archive.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::guard::AllowList;
use crate::member::Member;

/// Filename used when the suggested one is empty after escaping.
pub const DEFAULT_FILENAME: &str = "archive.zip";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    #[serde(default)]
    suggested_filename: String,
    #[serde(default)]
    files: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestEntry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    url: String,
    #[serde(default)]
    zip_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestOut<'a> {
    suggested_filename: &'a str,
    files: Vec<ManifestEntry>,
}

/// A parsed manifest: ordered members plus a suggested download name.
#[derive(Debug, Clone, Default)]
pub struct Descriptor {
    suggested_filename_raw: String,
    files: Vec<Member>,
}

impl Descriptor {
    pub fn new(suggested_filename: impl Into<String>, files: Vec<Member>) -> Self {
        Self {
            suggested_filename_raw: suggested_filename.into(),
            files,
        }
    }

    /// Parse a JSON manifest, validating each entry against `guard`.
    ///
    /// Fails only when the top level is not a manifest object. Entries that
    /// are malformed, lack a URL, or fail member validation are skipped.
    pub fn parse(raw: &[u8], guard: &AllowList) -> Result<Self> {
        let manifest: RawManifest = serde_json::from_slice(raw)?;
        let mut files = Vec::with_capacity(manifest.files.len());

        for value in manifest.files {
            let entry: ManifestEntry = match serde_json::from_value(value) {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("dropping malformed manifest entry: {e}");
                    continue;
                }
            };

            // A file entry must have a URL.
            if entry.url.is_empty() && !entry.zip_path.ends_with('/') {
                debug!("dropping {:?}: no url", entry.zip_path);
                continue;
            }

            let url = (!entry.url.is_empty()).then_some(entry.url.as_str());
            match Member::new(url, &entry.zip_path, guard) {
                Ok(member) => files.push(match entry.size {
                    Some(size) => member.with_size(size),
                    None => member,
                }),
                Err(e) => debug!("dropping manifest entry: {e}"),
            }
        }

        Ok(Self {
            suggested_filename_raw: manifest.suggested_filename,
            files,
        })
    }

    /// Members in archive order.
    pub fn files(&self) -> &[Member] {
        &self.files
    }

    pub fn into_files(self) -> Vec<Member> {
        self.files
    }

    /// The suggested filename, safe for a `Content-Disposition` value.
    ///
    /// Keeps printable ASCII except `"`, ensures a `.zip` suffix and falls
    /// back to [`DEFAULT_FILENAME`].
    pub fn escaped_suggested_filename(&self) -> String {
        let escaped: String = self
            .suggested_filename_raw
            .chars()
            .filter(|&c| matches!(c, ' '..='~') && c != '"')
            .collect();

        if escaped.is_empty() || escaped == ".zip" {
            DEFAULT_FILENAME.to_string()
        } else if escaped.ends_with(".zip") {
            escaped
        } else {
            escaped + ".zip"
        }
    }

    /// Serialize back to the manifest form accepted by [`Descriptor::parse`].
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let files = self
            .files
            .iter()
            .map(|m| ManifestEntry {
                url: m.url().map(|u| u.as_str().to_string()).unwrap_or_default(),
                zip_path: m.zip_path().to_string(),
                size: m.size(),
            })
            .collect();

        Ok(serde_json::to_vec(&ManifestOut {
            suggested_filename: &self.suggested_filename_raw,
            files,
        })?)
    }
}
