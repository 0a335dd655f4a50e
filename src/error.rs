use thiserror::Error;

/// Errors produced while validating members and assembling archives.
///
/// Validation variants (`InvalidPath`, `InvalidUrl`, `UrlNotAllowed`) are
/// normally absorbed by whoever builds the member list. The archive-writer
/// variants (`Io`, `BodyRead`, `ArchiveTooLarge`, `UnsupportedCompression`)
/// abort a stream, and the output written so far is truncated.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Zip path is absolute, empty after cleaning, or escapes the archive root.
    #[error("invalid zip path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// URL does not parse or is not http/https.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// URL is outside the configured allow-list prefix.
    #[error("url not allowed: {0}")]
    UrlNotAllowed(String),

    /// Manifest is not a JSON object of the expected shape.
    #[error("malformed manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Writing to the sink failed.
    #[error("archive write failed: {0}")]
    Io(#[from] std::io::Error),

    /// A member body broke off after its header was written.
    #[error("reading body of {path:?} failed: {source}")]
    BodyRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A size, offset or entry count does not fit the non-zip64 format.
    #[error("archive exceeds zip32 limits: {0}")]
    ArchiveTooLarge(&'static str),

    /// The archive writer has no encoder for this method.
    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    /// Every member was skipped, or there were none.
    #[error("empty archive: all files and folders failed")]
    AllMembersFailed,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
