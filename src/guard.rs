//! URL allow-list applied when members are constructed.

use crate::error::Result;
use crate::member::Member;

/// Environment variable read by [`AllowList::from_env`].
pub const URL_PREFIX_ENV_VAR: &str = "ZS_URL_PREFIX";

/// Restricts which URLs a file member may point at.
///
/// Every file member must start with `prefix`, compared on the raw URL
/// string. An empty prefix permits any http/https URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    prefix: String,
}

impl AllowList {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Build the guard from `ZS_URL_PREFIX`, or the empty prefix if unset.
    pub fn from_env() -> Self {
        Self::new(std::env::var(URL_PREFIX_ENV_VAR).unwrap_or_default())
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns `true` when no prefix is configured.
    pub fn is_open(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Returns `true` when the prefix ends its host with a `/`.
    ///
    /// Without it, `https://cdn.example.com` also admits
    /// `https://cdn.example.com.evil/` and `https://cdn.example.com@evil/`.
    pub fn bounds_host(&self) -> bool {
        self.prefix
            .split_once("://")
            .is_some_and(|(_, rest)| rest.contains('/'))
    }

    pub fn permits(&self, url: &str) -> bool {
        url.starts_with(&self.prefix)
    }

    /// Construct a file member checked against this guard.
    pub fn member(&self, url: &str, zip_path: &str) -> Result<Member> {
        Member::new(Some(url), zip_path, self)
    }

    /// Construct a directory marker. `zip_path` must end with `/`.
    pub fn directory(&self, zip_path: &str) -> Result<Member> {
        Member::new(None, zip_path, self)
    }
}
