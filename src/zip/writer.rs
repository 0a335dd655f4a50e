//! Incremental ZIP writer.
//!
//! Entries are written front to back without seeking. File entries carry
//! flag bit 3 with zeroed CRC and sizes in the local header; the real values
//! are written only to the central directory on [`ArchiveWriter::close`].
//! No trailing data descriptor is emitted, which keeps every entry at a
//! length that [`estimate`](super::estimate) can predict.

use std::io::Write;
use std::mem;

use crc32fast::Hasher;
use flate2::Compression;
use flate2::write::DeflateEncoder;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::error::{Error, Result};

use super::structures::{
    CompressionMethod, DIRECTORY_EXTERNAL_ATTRS, DosDateTime, EndOfCentralDirectory, EntryHeader,
    FILE_EXTERNAL_ATTRS, FLAG_ZEROED_LOCAL_SIZES, name_flags,
};

/// Writes a ZIP container to an async sink one entry at a time.
pub struct ArchiveWriter<W: AsyncWrite + Unpin> {
    sink: BufWriter<W>,
    entries: Vec<EntryHeader>,
    written: u64,
}

impl<W: AsyncWrite + Unpin> ArchiveWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink: BufWriter::new(sink),
            entries: Vec::new(),
            written: 0,
        }
    }

    /// Bytes handed to the sink so far, including buffered ones.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write an empty directory entry. A missing trailing `/` is added.
    pub async fn add_directory(&mut self, name: &str, modified: DosDateTime) -> Result<()> {
        let file_name = if name.ends_with('/') {
            name.to_string()
        } else {
            format!("{name}/")
        };

        let header = EntryHeader {
            flags: name_flags(&file_name),
            file_name,
            compression_method: CompressionMethod::Stored,
            modified,
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            external_attrs: DIRECTORY_EXTERNAL_ATTRS,
            lfh_offset: self.offset()?,
        };
        self.write_raw(&header.local_header_bytes()?).await?;
        self.entries.push(header);
        Ok(())
    }

    /// Write a local header and return a handle for the entry's body.
    ///
    /// The entry only reaches the central directory once
    /// [`EntryWriter::finish`] is called.
    pub async fn start_file(
        &mut self,
        name: &str,
        method: CompressionMethod,
        modified: DosDateTime,
    ) -> Result<EntryWriter<'_, W>> {
        let encoder = match method {
            CompressionMethod::Stored => None,
            CompressionMethod::Deflate => {
                Some(DeflateEncoder::new(Vec::new(), Compression::default()))
            }
            CompressionMethod::Unknown(code) => return Err(Error::UnsupportedCompression(code)),
        };

        let header = EntryHeader {
            file_name: name.to_string(),
            flags: FLAG_ZEROED_LOCAL_SIZES | name_flags(name),
            compression_method: method,
            modified,
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            external_attrs: FILE_EXTERNAL_ATTRS,
            lfh_offset: self.offset()?,
        };
        self.write_raw(&header.local_header_bytes()?).await?;

        Ok(EntryWriter {
            archive: self,
            header,
            hasher: Hasher::new(),
            encoder,
            compressed: 0,
            uncompressed: 0,
        })
    }

    /// Push buffered bytes through to the sink and flush it.
    pub async fn flush(&mut self) -> Result<()> {
        self.sink.flush().await?;
        Ok(())
    }

    /// Write the central directory and end record, then return the sink.
    pub async fn close(mut self) -> Result<W> {
        self.write_central_directory().await?;
        Ok(self.sink.into_inner())
    }

    /// Write the central directory and end record and flush the sink.
    ///
    /// Nothing may be added afterwards.
    pub async fn write_central_directory(&mut self) -> Result<()> {
        let total_entries = u16::try_from(self.entries.len())
            .map_err(|_| Error::ArchiveTooLarge("more than 65535 entries"))?;
        let cd_offset = self.offset()?;

        let entries = mem::take(&mut self.entries);
        for entry in &entries {
            self.write_raw(&entry.central_header_bytes()?).await?;
        }
        let cd_size = u32::try_from(self.written - cd_offset as u64)
            .map_err(|_| Error::ArchiveTooLarge("central directory"))?;

        let eocd = EndOfCentralDirectory::new(total_entries, cd_size, cd_offset);
        self.write_raw(&eocd.to_bytes()?).await?;
        self.sink.flush().await?;
        Ok(())
    }

    /// Current offset as a 32-bit ZIP field.
    fn offset(&self) -> Result<u32> {
        u32::try_from(self.written).map_err(|_| Error::ArchiveTooLarge("archive offset"))
    }

    async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.sink.write_all(data).await?;
        self.written += data.len() as u64;
        Ok(())
    }
}

/// Body of a file entry in progress.
pub struct EntryWriter<'a, W: AsyncWrite + Unpin> {
    archive: &'a mut ArchiveWriter<W>,
    header: EntryHeader,
    hasher: Hasher,
    encoder: Option<DeflateEncoder<Vec<u8>>>,
    compressed: u64,
    uncompressed: u64,
}

impl<W: AsyncWrite + Unpin> EntryWriter<'_, W> {
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.hasher.update(data);
        self.uncompressed += data.len() as u64;

        match &mut self.encoder {
            Some(encoder) => {
                encoder.write_all(data)?;
                let out = mem::take(encoder.get_mut());
                self.compressed += out.len() as u64;
                self.archive.write_raw(&out).await?;
            }
            None => {
                self.compressed += data.len() as u64;
                self.archive.write_raw(data).await?;
            }
        }
        Ok(())
    }

    /// Record the entry for the central directory. Returns the uncompressed length.
    pub async fn finish(mut self) -> Result<u64> {
        if let Some(encoder) = self.encoder.take() {
            let out = encoder.finish()?;
            self.compressed += out.len() as u64;
            self.archive.write_raw(&out).await?;
        }

        let mut header = self.header;
        header.crc32 = self.hasher.finalize();
        header.compressed_size = u32::try_from(self.compressed)
            .map_err(|_| Error::ArchiveTooLarge("entry compressed size"))?;
        header.uncompressed_size = u32::try_from(self.uncompressed)
            .map_err(|_| Error::ArchiveTooLarge("entry size"))?;
        self.archive.entries.push(header);

        Ok(self.uncompressed)
    }
}

/// Write the 22-byte archive with no entries.
pub async fn write_empty_archive<W: AsyncWrite + Unpin>(sink: W) -> Result<W> {
    ArchiveWriter::new(sink).close().await
}
