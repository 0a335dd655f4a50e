//! Member-by-member archive assembly.

use tokio::io::AsyncWrite;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::io::{Body, Fetch};
use crate::member::{Member, MemberKind};

use super::structures::{CompressionMethod, DosDateTime};
use super::writer::ArchiveWriter;

/// What a successful [`ZipStream::stream_all_files`] run wrote and skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamReport {
    /// Directory entries written.
    pub directories: usize,
    /// File entries written.
    pub files: usize,
    /// Uncompressed payload bytes written.
    pub payload_bytes: u64,
    /// Total bytes written to the sink, including headers.
    pub archive_bytes: u64,
    /// Zip paths of file members whose fetch failed.
    pub skipped: Vec<String>,
}

impl StreamReport {
    pub fn succeeded(&self) -> usize {
        self.directories + self.files
    }
}

/// One archive transmission: members in, ZIP bytes out.
///
/// Members are processed strictly in order, one upstream request at a time.
/// Fetch failures skip the member; any failure of the archive writer or
/// the sink aborts the stream without writing a central directory.
pub struct ZipStream<'a, F: ?Sized, W> {
    entries: &'a [Member],
    fetcher: &'a F,
    destination: W,
    compression: CompressionMethod,
}

impl<'a, F, W> ZipStream<'a, F, W>
where
    F: Fetch + ?Sized,
    W: AsyncWrite + Unpin,
{
    pub fn new(entries: &'a [Member], fetcher: &'a F, destination: W) -> Self {
        Self {
            entries,
            fetcher,
            destination,
            compression: CompressionMethod::Stored,
        }
    }

    /// Method for file entries. Anything but stored invalidates the estimate.
    pub fn with_compression(mut self, method: CompressionMethod) -> Self {
        self.compression = method;
        self
    }

    pub async fn stream_all_files(self) -> Result<StreamReport> {
        let mut archive = ArchiveWriter::new(self.destination);
        let modified = DosDateTime::now();
        let mut report = StreamReport::default();

        for entry in self.entries {
            match entry.kind() {
                MemberKind::Directory => {
                    debug!("adding directory {}", entry.zip_path());
                    archive.add_directory(entry.zip_path(), modified).await?;
                    report.directories += 1;
                }
                MemberKind::File { url, .. } => {
                    let mut body: Box<dyn Body> = match self.fetcher.fetch(url).await {
                        Ok(body) => body,
                        Err(e) => {
                            warn!("skipping {}: {e:#}", entry.zip_path());
                            report.skipped.push(entry.zip_path().to_string());
                            continue;
                        }
                    };

                    let mut writer = archive
                        .start_file(entry.zip_path(), self.compression, modified)
                        .await?;
                    loop {
                        let chunk = body.chunk().await.map_err(|source| Error::BodyRead {
                            path: entry.zip_path().to_string(),
                            source,
                        })?;
                        let Some(chunk) = chunk else { break };
                        writer.write(&chunk).await?;
                    }
                    let len = writer.finish().await?;

                    debug!("added {} ({len} bytes)", entry.zip_path());
                    report.files += 1;
                    report.payload_bytes += len;
                }
            }

            archive.flush().await?;
        }

        archive.write_central_directory().await?;
        report.archive_bytes = archive.bytes_written();

        if report.succeeded() == 0 {
            return Err(Error::AllMembersFailed);
        }
        Ok(report)
    }
}
