//! Archive length prediction.
//!
//! The stored encoding copies bodies verbatim and [`ArchiveWriter`] emits no
//! extra fields, comments or data descriptors, so the final length follows
//! from names and sizes alone. This lets a caller declare the length before
//! the first byte is fetched.
//!
//! [`ArchiveWriter`]: super::ArchiveWriter

use std::fmt;

use crate::member::Member;

use super::structures::{CDFH_MIN_SIZE, EndOfCentralDirectory, LFH_SIZE};

/// Byte counts of each region of a stored archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeBreakdown {
    pub local_headers: u64,
    pub file_data: u64,
    pub central_directory: u64,
    pub end_of_central_directory: u64,
}

impl SizeBreakdown {
    pub fn total(&self) -> u64 {
        self.local_headers
            .saturating_add(self.file_data)
            .saturating_add(self.central_directory)
            .saturating_add(self.end_of_central_directory)
    }
}

impl fmt::Display for SizeBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Local headers:            {:>12} bytes", self.local_headers)?;
        writeln!(f, "File data:                {:>12} bytes", self.file_data)?;
        writeln!(f, "Central directory:        {:>12} bytes", self.central_directory)?;
        writeln!(f, "End of central directory: {:>12} bytes", self.end_of_central_directory)?;
        write!(f, "Total:                    {:>12} bytes", self.total())
    }
}

/// Compute the exact length of the stored archive for `members`.
///
/// Files without a known size count as empty. Sums saturate at `u64::MAX`
/// rather than wrap. The result only matches the streamed output when every
/// file fetches successfully with its declared size.
pub fn estimate(members: &[Member]) -> SizeBreakdown {
    let mut breakdown = SizeBreakdown {
        end_of_central_directory: EndOfCentralDirectory::SIZE as u64,
        ..Default::default()
    };

    for member in members {
        let name_len = member.zip_path().len() as u64;
        breakdown.local_headers =
            breakdown.local_headers.saturating_add(LFH_SIZE as u64 + name_len);
        breakdown.central_directory =
            breakdown.central_directory.saturating_add(CDFH_MIN_SIZE as u64 + name_len);
        breakdown.file_data = breakdown.file_data.saturating_add(member.size().unwrap_or(0));
    }

    breakdown
}
