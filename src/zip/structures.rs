use byteorder::{LittleEndian, ReadBytesExt};
use std::borrow::Cow;
use std::io::{Cursor, Read};

use crate::zip::error::ScanError;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// General purpose flag bits (PKZIP APPNOTE 4.4.4)
pub const FLAG_ENCRYPTED: u16 = 0x0001;
/// CRC and sizes were unknown when the header was written; a data
/// descriptor follows the payload.
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;
pub const FLAG_PATCHED: u16 = 0x0010;
pub const FLAG_STRONG_ENCRYPTION: u16 = 0x0020;

/// Minimum version-needed value that switches the data descriptor to
/// 64-bit size fields (4.5, ZIP64).
pub const VERSION_ZIP64: u16 = 45;

/// Central Directory File Header (CDFH) signature - marks the clean end
/// of the local entry sequence
pub const CDFH_SIGNATURE: u32 = 0x0201_4b50; // PK\x01\x02

/// Local File Header (LFH) - 30 bytes + filename + extra
pub const LFH_SIGNATURE: u32 = 0x0403_4b50; // PK\x03\x04
pub const LFH_SIZE: usize = 30;

/// Parsed local file header for one archive entry.
///
/// Constructed fresh per scan iteration from the 30 fixed header bytes
/// plus the variable-length name; the extra field is consumed and
/// discarded. For entries with [`FLAG_DATA_DESCRIPTOR`] set, the CRC and
/// size fields here are placeholders until the trailing descriptor is
/// resolved.
#[derive(Debug, Clone)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub flags: u16,
    pub method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub file_name_length: u16,
    pub extra_field_length: u16,
    /// File name exactly as stored; no encoding normalization.
    pub raw_name: Vec<u8>,
}

impl LocalFileHeader {
    /// Parse the fixed 30-byte header record.
    ///
    /// The caller has already checked the leading signature; `data` must
    /// be the full record including it. The name and extra field follow
    /// in the stream and are read separately.
    pub fn from_bytes(data: &[u8; LFH_SIZE]) -> Result<Self, ScanError> {
        let mut cursor = Cursor::new(&data[4..]);

        let read = |c: &mut Cursor<&[u8]>| -> std::io::Result<LocalFileHeader> {
            Ok(LocalFileHeader {
                version_needed: c.read_u16::<LittleEndian>()?,
                flags: c.read_u16::<LittleEndian>()?,
                method: CompressionMethod::from_u16(c.read_u16::<LittleEndian>()?),
                last_mod_time: c.read_u16::<LittleEndian>()?,
                last_mod_date: c.read_u16::<LittleEndian>()?,
                crc32: c.read_u32::<LittleEndian>()?,
                compressed_size: c.read_u32::<LittleEndian>()? as u64,
                uncompressed_size: c.read_u32::<LittleEndian>()? as u64,
                file_name_length: c.read_u16::<LittleEndian>()?,
                extra_field_length: c.read_u16::<LittleEndian>()?,
                raw_name: Vec::new(),
            })
        };

        read(&mut cursor).map_err(|source| ScanError::TruncatedRead {
            what: "local file header",
            source,
        })
    }

    /// Whether a data descriptor follows this entry's payload.
    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    /// Whether the descriptor for this entry uses 64-bit size fields.
    pub fn uses_zip64_descriptor(&self) -> bool {
        self.version_needed >= VERSION_ZIP64
    }

    /// File name for display and path construction. Lossy: the core keeps
    /// the raw bytes, destinations get a best-effort UTF-8 view.
    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw_name)
    }

    /// Directory entries end with '/'
    pub fn is_directory(&self) -> bool {
        self.raw_name.ends_with(b"/")
    }

    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.last_mod_date & 0x1F) as u8;
        let month = ((self.last_mod_date >> 5) & 0x0F) as u8;
        let year = ((self.last_mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.last_mod_time & 0x1F) * 2) as u8;
        let minute = ((self.last_mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.last_mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }

    /// Human-readable summary of the general purpose flag bits, used by
    /// the debug dump. Bits 1-2 are method-specific.
    pub fn flag_summary(&self) -> String {
        let mut s = String::new();

        if self.flags & FLAG_ENCRYPTED != 0 {
            s.push_str(" Encrypted");
        }

        match self.method.as_u16() {
            6 => {
                // Implode: dictionary size and Shannon-Fano tree count
                if self.flags & 0x02 != 0 {
                    s.push_str(" 8k");
                }
                if self.flags & 0x04 != 0 {
                    s.push_str(" 3SF");
                }
            }
            14 => {
                // LZMA: end-of-stream marker
                if self.flags & 0x02 != 0 {
                    s.push_str(" EOS");
                }
            }
            _ => match (self.flags & 0x06) >> 1 {
                0 => s.push_str(" Normal"),
                1 => s.push_str(" Max"),
                2 => s.push_str(" Fast"),
                _ => s.push_str(" SuperFast"),
            },
        }

        if self.has_data_descriptor() {
            s.push_str(" DataDesc");
        }
        if self.flags & FLAG_PATCHED != 0 {
            s.push_str(" Patched");
        }
        if self.flags & FLAG_STRONG_ENCRYPTION != 0 {
            s.push_str(" StrongEncryption");
        }

        s
    }
}

/// Data descriptor: the trailing CRC/size record written by streaming
/// producers. Layout varies: the 4-byte signature is optional, and the
/// size fields are 32-bit or 64-bit depending on the entry's
/// version-needed. Both variations are sniffed by [`DataDescriptor::read_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataDescriptor {
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    /// Whether the on-disk record carried the PK\x07\x08 prefix.
    pub has_signature: bool,
}

impl DataDescriptor {
    pub const SIGNATURE: u32 = 0x0807_4b50; // PK\x07\x08

    /// Record length excluding the optional signature: three u32, or a
    /// u32 CRC plus two u64 sizes for ZIP64 entries.
    pub const SIZE: usize = 12;
    pub const SIZE_ZIP64: usize = 20;

    /// Read one data descriptor from the stream.
    ///
    /// Resolution is a two-step sniff: read 4 bytes; if they are the
    /// descriptor signature, the whole record follows them, otherwise
    /// they are already the CRC field and only the size fields remain.
    /// A short read anywhere here is fatal - without the full record the
    /// next entry boundary is unknown.
    pub fn read_from<R: Read>(reader: &mut R, zip64: bool) -> Result<Self, ScanError> {
        let len = if zip64 { Self::SIZE_ZIP64 } else { Self::SIZE };
        let mut buf = [0u8; Self::SIZE_ZIP64];

        let truncated = |source| ScanError::TruncatedRead {
            what: "data descriptor",
            source,
        };

        reader.read_exact(&mut buf[0..4]).map_err(truncated)?;

        let has_signature = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) == Self::SIGNATURE;
        if has_signature {
            // The record proper starts after the signature; overwrite it.
            reader.read_exact(&mut buf[0..len]).map_err(truncated)?;
        } else {
            // No signature: the 4 bytes already read are the CRC.
            reader.read_exact(&mut buf[4..len]).map_err(truncated)?;
        }

        let mut cursor = Cursor::new(&buf[..len]);
        let read = |c: &mut Cursor<&[u8]>| -> std::io::Result<(u32, u64, u64)> {
            let crc32 = c.read_u32::<LittleEndian>()?;
            let (compressed, uncompressed) = if zip64 {
                (c.read_u64::<LittleEndian>()?, c.read_u64::<LittleEndian>()?)
            } else {
                (
                    c.read_u32::<LittleEndian>()? as u64,
                    c.read_u32::<LittleEndian>()? as u64,
                )
            };
            Ok((crc32, compressed, uncompressed))
        };
        let (crc32, compressed_size, uncompressed_size) =
            read(&mut cursor).map_err(truncated)?;

        Ok(Self {
            crc32,
            compressed_size,
            uncompressed_size,
            has_signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{LittleEndian, WriteBytesExt};

    fn descriptor_bytes(signed: bool, crc: u32, clen: u64, ulen: u64, zip64: bool) -> Vec<u8> {
        let mut buf = Vec::new();
        if signed {
            buf.write_u32::<LittleEndian>(DataDescriptor::SIGNATURE).unwrap();
        }
        buf.write_u32::<LittleEndian>(crc).unwrap();
        if zip64 {
            buf.write_u64::<LittleEndian>(clen).unwrap();
            buf.write_u64::<LittleEndian>(ulen).unwrap();
        } else {
            buf.write_u32::<LittleEndian>(clen as u32).unwrap();
            buf.write_u32::<LittleEndian>(ulen as u32).unwrap();
        }
        buf
    }

    #[test]
    fn descriptor_with_and_without_signature_decode_identically() {
        let with = descriptor_bytes(true, 0xDEADBEEF, 42, 1000, false);
        let without = descriptor_bytes(false, 0xDEADBEEF, 42, 1000, false);

        let a = DataDescriptor::read_from(&mut with.as_slice(), false).unwrap();
        let b = DataDescriptor::read_from(&mut without.as_slice(), false).unwrap();

        assert!(a.has_signature);
        assert!(!b.has_signature);
        assert_eq!(a.crc32, b.crc32);
        assert_eq!(a.compressed_size, b.compressed_size);
        assert_eq!(a.uncompressed_size, b.uncompressed_size);
    }

    #[test]
    fn descriptor_zip64_reads_eight_byte_sizes() {
        let clen = 0x1_0000_0001u64;
        let ulen = 0x2_0000_0002u64;
        let bytes = descriptor_bytes(true, 0x0102_0304, clen, ulen, true);

        let d = DataDescriptor::read_from(&mut bytes.as_slice(), true).unwrap();
        assert_eq!(d.crc32, 0x0102_0304);
        assert_eq!(d.compressed_size, clen);
        assert_eq!(d.uncompressed_size, ulen);
    }

    #[test]
    fn descriptor_consumes_exact_record_length() {
        // Trailing bytes after the record must be left in the stream.
        let mut bytes = descriptor_bytes(false, 1, 2, 3, false);
        bytes.extend_from_slice(b"next");
        let mut cursor = bytes.as_slice();

        DataDescriptor::read_from(&mut cursor, false).unwrap();
        assert_eq!(cursor, b"next");
    }

    #[test]
    fn descriptor_short_read_is_truncated() {
        let bytes = descriptor_bytes(true, 1, 2, 3, false);
        let err = DataDescriptor::read_from(&mut bytes[..10].as_ref(), false).unwrap_err();
        assert!(matches!(err, ScanError::TruncatedRead { .. }));
    }

    #[test]
    fn zip64_descriptor_rejects_short_record() {
        // A 32-bit record fed to a ZIP64 entry runs out of bytes.
        let bytes = descriptor_bytes(true, 1, 2, 3, false);
        let err = DataDescriptor::read_from(&mut bytes.as_slice(), true).unwrap_err();
        assert!(matches!(err, ScanError::TruncatedRead { .. }));
    }

    #[test]
    fn header_from_bytes_decodes_fixed_fields() {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(LFH_SIGNATURE).unwrap();
        buf.write_u16::<LittleEndian>(20).unwrap(); // version needed
        buf.write_u16::<LittleEndian>(FLAG_DATA_DESCRIPTOR).unwrap();
        buf.write_u16::<LittleEndian>(8).unwrap(); // deflate
        buf.write_u16::<LittleEndian>(0x6000).unwrap(); // 12:00:00
        buf.write_u16::<LittleEndian>(0x5A61).unwrap(); // 2025-03-01
        buf.write_u32::<LittleEndian>(0xCAFEBABE).unwrap();
        buf.write_u32::<LittleEndian>(100).unwrap();
        buf.write_u32::<LittleEndian>(400).unwrap();
        buf.write_u16::<LittleEndian>(7).unwrap();
        buf.write_u16::<LittleEndian>(0).unwrap();

        let header = LocalFileHeader::from_bytes((&buf[..]).try_into().unwrap()).unwrap();
        assert_eq!(header.version_needed, 20);
        assert!(header.has_data_descriptor());
        assert!(!header.uses_zip64_descriptor());
        assert_eq!(header.method, CompressionMethod::Deflate);
        assert_eq!(header.crc32, 0xCAFEBABE);
        assert_eq!(header.compressed_size, 100);
        assert_eq!(header.uncompressed_size, 400);
        assert_eq!(header.file_name_length, 7);
        assert_eq!(header.mod_time(), (12, 0, 0));
        assert_eq!(header.mod_date(), (2025, 3, 1));
    }
}
