//! # zipstreamer
//!
//! Bundle remotely hosted files into a single ZIP archive that is streamed
//! to the client while it is being built.
//!
//! Files are fetched one after another over HTTP and copied straight into
//! the output, so neither the files nor the archive are ever buffered whole.
//! Entries use the stored (uncompressed) method, which makes the archive's
//! final length computable up front from names and declared sizes, so a
//! server can send `Content-Length` before the first fetch.
//!
//! To keep that length exact, no data descriptor follows a file's body: its
//! CRC-32 and sizes are written only to the central directory. Readers that
//! use the central directory (`unzip`, 7-Zip, Python's `zipfile`, the `zip`
//! crate) extract these archives. Readers that walk local headers front to
//! back, such as Java's `ZipInputStream` or `bsdtar` fed from a pipe, do not.
//!
//! ## Features
//!
//! - Validated members: relative, cleaned zip paths and allow-listed http(s) URLs
//! - Best-effort JSON manifests: bad entries are dropped, not fatal
//! - Exact archive size prediction for the stored method
//! - Per-member fetch failures are skipped; sink failures abort
//! - Folder walking over a `list(path)` API to build the member list
//!
//! ## Example
//!
//! ```no_run
//! use zipstreamer::{AllowList, Descriptor, HttpFetcher, ZipStream, estimate};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let guard = AllowList::new("https://cdn.example.com/");
//!     let manifest = br#"{"suggestedFilename": "photos", "files": [
//!         {"url": "https://cdn.example.com/a.jpg", "zipPath": "photos/a.jpg", "size": 1024}
//!     ]}"#;
//!     let descriptor = Descriptor::parse(manifest, &guard)?;
//!
//!     // Known before anything is fetched
//!     let size = estimate(descriptor.files());
//!     println!("{} -> {} bytes", descriptor.escaped_suggested_filename(), size.total());
//!
//!     let fetcher = HttpFetcher::new()?;
//!     let file = tokio::fs::File::create("photos.zip").await?;
//!     ZipStream::new(descriptor.files(), &fetcher, file)
//!         .stream_all_files()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod descriptor;
pub mod error;
pub mod guard;
pub mod io;
pub mod listing;
pub mod member;
pub mod zip;

pub use cli::Cli;
pub use descriptor::Descriptor;
pub use error::{Error, Result};
pub use guard::AllowList;
pub use io::{Body, Fetch, HttpFetcher};
pub use listing::{EntryKind, FolderLister, Listing, ListingEntry, PremiumizeLister, collect_members};
pub use member::{Member, MemberKind};
pub use crate::zip::{
    CompressionMethod, SizeBreakdown, StreamReport, ZipStream, estimate, write_empty_archive,
};
