//! Validated archive members.
//!
//! A [`Member`] is either a directory marker or a file to fetch. The only way
//! to obtain one is [`Member::new`] (or the [`AllowList`] shortcuts), which
//! cleans the zip path and checks the URL, so a `Member` in hand is always
//! safe to write.

use reqwest::Url;

use crate::error::{Error, Result};
use crate::guard::AllowList;

/// What a member contributes to the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    /// An empty directory entry. Carries no content.
    Directory,
    /// A file whose bytes are fetched from `url`.
    File {
        url: Url,
        /// Body length reported upstream, used only for size estimation.
        size: Option<u64>,
    },
}

/// One entry of the output archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    zip_path: String,
    kind: MemberKind,
}

impl Member {
    /// Validate and construct a member.
    ///
    /// A `zip_path` ending in `/` makes a directory marker and `url` is
    /// ignored. Anything else is a file and needs an absolute http(s) URL
    /// that `guard` permits.
    pub fn new(url: Option<&str>, zip_path: &str, guard: &AllowList) -> Result<Self> {
        let cleaned = clean_zip_path(zip_path)?;

        if zip_path.ends_with('/') {
            return Ok(Self {
                zip_path: format!("{cleaned}/"),
                kind: MemberKind::Directory,
            });
        }

        let raw = url.unwrap_or_default();
        let parsed = Url::parse(raw).map_err(|e| Error::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::InvalidUrl {
                url: raw.to_string(),
                reason: format!("scheme {:?} is not http or https", parsed.scheme()),
            });
        }
        if !guard.permits(raw) {
            return Err(Error::UrlNotAllowed(raw.to_string()));
        }

        Ok(Self {
            zip_path: cleaned,
            kind: MemberKind::File {
                url: parsed,
                size: None,
            },
        })
    }

    /// Attach an upstream-reported size. Directory markers are returned unchanged.
    pub fn with_size(mut self, len: u64) -> Self {
        if let MemberKind::File { size, .. } = &mut self.kind {
            *size = Some(len);
        }
        self
    }

    /// Name of the entry inside the archive. Directories end with `/`.
    pub fn zip_path(&self) -> &str {
        &self.zip_path
    }

    pub fn kind(&self) -> &MemberKind {
        &self.kind
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, MemberKind::Directory)
    }

    pub fn url(&self) -> Option<&Url> {
        match &self.kind {
            MemberKind::File { url, .. } => Some(url),
            MemberKind::Directory => None,
        }
    }

    /// Declared content length; `None` for directories and unsized files.
    pub fn size(&self) -> Option<u64> {
        match self.kind {
            MemberKind::File { size, .. } => size,
            MemberKind::Directory => None,
        }
    }
}

/// Lexically clean a relative zip path.
///
/// Empty and `.` segments are dropped and `..` removes the previous segment.
/// The result has no leading or trailing `/`.
fn clean_zip_path(path: &str) -> Result<String> {
    let invalid = |reason| Error::InvalidPath {
        path: path.to_string(),
        reason,
    };

    if path.starts_with('/') {
        return Err(invalid("zip path must be relative"));
    }
    if path.contains('\\') || path.contains('\0') {
        return Err(invalid("zip path contains a backslash or NUL"));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(invalid("zip path escapes the archive root"));
                }
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(invalid("zip path is empty"));
    }

    let cleaned = segments.join("/");
    // Room for the trailing '/' of a directory marker.
    if cleaned.len() >= u16::MAX as usize {
        return Err(invalid("zip path is too long"));
    }
    Ok(cleaned)
}
