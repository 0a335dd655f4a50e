use byteorder::{LittleEndian, WriteBytesExt};
use std::io;
use time::OffsetDateTime;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    #[default]
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// General purpose bit 3, set with CRC-32 and sizes zeroed in the local
/// header. No data descriptor follows the body; the values live only in the
/// central directory.
pub const FLAG_ZEROED_LOCAL_SIZES: u16 = 1 << 3;
/// General purpose flag: file name is UTF-8.
pub const FLAG_UTF8_NAME: u16 = 1 << 11;

/// Version 2.0: directories and deflate.
pub const VERSION_NEEDED: u16 = 20;
/// Unix host, format version 2.0, so extractors honour the mode bits.
pub const VERSION_MADE_BY: u16 = (3 << 8) | 20;

/// `-rw-r--r--` regular file.
pub const FILE_EXTERNAL_ATTRS: u32 = 0o100644 << 16;
/// `drwxr-xr-x` plus the MS-DOS directory bit.
pub const DIRECTORY_EXTERNAL_ATTRS: u32 = (0o040755 << 16) | 0x10;

/// General purpose flags for an entry name.
pub fn name_flags(name: &str) -> u16 {
    if name.is_ascii() { 0 } else { FLAG_UTF8_NAME }
}

/// MS-DOS date and time as stored in ZIP headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    pub date: u16,
    pub time: u16,
}

impl DosDateTime {
    /// 1980-01-01 00:00:00, the earliest representable instant.
    pub const MIN: Self = Self {
        date: (1 << 5) | 1,
        time: 0,
    };

    pub fn now() -> Self {
        Self::from(OffsetDateTime::now_utc())
    }

    /// Decode to (year, month, day)
    #[cfg(test)]
    pub fn ymd(&self) -> (u16, u8, u8) {
        let day = (self.date & 0x1F) as u8;
        let month = ((self.date >> 5) & 0x0F) as u8;
        let year = ((self.date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Decode to (hour, minute, second)
    #[cfg(test)]
    pub fn hms(&self) -> (u8, u8, u8) {
        let second = ((self.time & 0x1F) * 2) as u8;
        let minute = ((self.time >> 5) & 0x3F) as u8;
        let hour = ((self.time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}

impl From<OffsetDateTime> for DosDateTime {
    fn from(dt: OffsetDateTime) -> Self {
        let year = dt.year();
        if !(1980..=2107).contains(&year) {
            return Self::MIN;
        }
        let month = u8::from(dt.month()) as u16;
        Self {
            date: ((year - 1980) as u16) << 9 | month << 5 | dt.day() as u16,
            time: (dt.hour() as u16) << 11 | (dt.minute() as u16) << 5 | dt.second() as u16 / 2,
        }
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: u32 = 0x06054b50;
    pub const SIZE: usize = 22;

    /// Single-disk record without a comment.
    pub fn new(entries: u16, cd_size: u32, cd_offset: u32) -> Self {
        Self {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: entries,
            total_entries: entries,
            cd_size,
            cd_offset,
            comment_len: 0,
        }
    }

    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(Self::SIZE);
        buf.write_u32::<LittleEndian>(Self::SIGNATURE)?;
        buf.write_u16::<LittleEndian>(self.disk_number)?;
        buf.write_u16::<LittleEndian>(self.disk_with_cd)?;
        buf.write_u16::<LittleEndian>(self.disk_entries)?;
        buf.write_u16::<LittleEndian>(self.total_entries)?;
        buf.write_u32::<LittleEndian>(self.cd_size)?;
        buf.write_u32::<LittleEndian>(self.cd_offset)?;
        buf.write_u16::<LittleEndian>(self.comment_len)?;
        Ok(buf)
    }
}

/// Local File Header (LFH) - 30 bytes plus the file name
pub const LFH_SIGNATURE: u32 = 0x04034b50;
pub const LFH_SIZE: usize = 30;

/// Central Directory File Header (CDFH) - 46 bytes plus the file name
pub const CDFH_SIGNATURE: u32 = 0x02014b50;
pub const CDFH_MIN_SIZE: usize = 46;

/// Fields shared by the local header and the central directory record.
///
/// No extra fields and no comments are ever written, so each record is
/// exactly its fixed size plus the name length.
#[derive(Debug, Clone)]
pub struct EntryHeader {
    pub file_name: String,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub modified: DosDateTime,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub external_attrs: u32,
    pub lfh_offset: u32,
}

impl EntryHeader {
    pub fn local_header_bytes(&self) -> io::Result<Vec<u8>> {
        let name = self.file_name.as_bytes();
        let mut buf = Vec::with_capacity(LFH_SIZE + name.len());
        buf.write_u32::<LittleEndian>(LFH_SIGNATURE)?;
        buf.write_u16::<LittleEndian>(VERSION_NEEDED)?;
        buf.write_u16::<LittleEndian>(self.flags)?;
        buf.write_u16::<LittleEndian>(self.compression_method.as_u16())?;
        buf.write_u16::<LittleEndian>(self.modified.time)?;
        buf.write_u16::<LittleEndian>(self.modified.date)?;
        buf.write_u32::<LittleEndian>(self.crc32)?;
        buf.write_u32::<LittleEndian>(self.compressed_size)?;
        buf.write_u32::<LittleEndian>(self.uncompressed_size)?;
        buf.write_u16::<LittleEndian>(name.len() as u16)?;
        buf.write_u16::<LittleEndian>(0)?; // extra field length
        buf.extend_from_slice(name);
        debug_assert_eq!(buf.len(), LFH_SIZE + name.len());
        Ok(buf)
    }

    pub fn central_header_bytes(&self) -> io::Result<Vec<u8>> {
        let name = self.file_name.as_bytes();
        let mut buf = Vec::with_capacity(CDFH_MIN_SIZE + name.len());
        buf.write_u32::<LittleEndian>(CDFH_SIGNATURE)?;
        buf.write_u16::<LittleEndian>(VERSION_MADE_BY)?;
        buf.write_u16::<LittleEndian>(VERSION_NEEDED)?;
        buf.write_u16::<LittleEndian>(self.flags)?;
        buf.write_u16::<LittleEndian>(self.compression_method.as_u16())?;
        buf.write_u16::<LittleEndian>(self.modified.time)?;
        buf.write_u16::<LittleEndian>(self.modified.date)?;
        buf.write_u32::<LittleEndian>(self.crc32)?;
        buf.write_u32::<LittleEndian>(self.compressed_size)?;
        buf.write_u32::<LittleEndian>(self.uncompressed_size)?;
        buf.write_u16::<LittleEndian>(name.len() as u16)?;
        buf.write_u16::<LittleEndian>(0)?; // extra field length
        buf.write_u16::<LittleEndian>(0)?; // file comment length
        buf.write_u16::<LittleEndian>(0)?; // disk number start
        buf.write_u16::<LittleEndian>(0)?; // internal attributes
        buf.write_u32::<LittleEndian>(self.external_attrs)?;
        buf.write_u32::<LittleEndian>(self.lfh_offset)?;
        buf.extend_from_slice(name);
        debug_assert_eq!(buf.len(), CDFH_MIN_SIZE + name.len());
        Ok(buf)
    }
}
