//! ZIP archive assembly.
//!
//! This module writes ZIP containers incrementally, predicting their exact
//! length before any byte is produced.
//!
//! ## Architecture
//!
//! - [`structures`]: ZIP format records (local header, central directory, EOCD)
//! - [`estimate`](mod@estimate): length prediction from names and sizes alone
//! - [`writer`]: low-level incremental writer tracking offsets and CRC-32
//! - [`stream`]: fetch-and-write loop over a member list
//!
//! ## Layout
//!
//! For each member, in order:
//! 1. Local file header (30 bytes + name)
//! 2. File data, copied verbatim for the stored method
//!
//! followed by one central directory record per member (46 bytes + name)
//! and the 22-byte end of central directory record.
//!
//! ## Limitations
//!
//! - No ZIP64: archives, entries and offsets are limited to 32 bits
//! - No data descriptors; CRC-32 and sizes live in the central directory only
//! - Deflate output is supported but its length cannot be predicted

pub mod estimate;
pub mod stream;
pub mod structures;
pub mod writer;

pub use estimate::{SizeBreakdown, estimate};
pub use stream::{StreamReport, ZipStream};
pub use structures::{CompressionMethod, DosDateTime};
pub use writer::{ArchiveWriter, EntryWriter, write_empty_archive};
