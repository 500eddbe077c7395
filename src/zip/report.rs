//! Listing output for recovered entries.
//!
//! Pure formatting over entry metadata; one fixed-width line per entry
//! in the style of `unzip -v`:
//!
//! ```text
//!      400  Defl:N       100  75%  cafebabe  docs/readme.txt
//! ```

use crate::zip::structures::{CompressionMethod, LocalFileHeader};

/// Metadata for one successfully recovered entry, in scan order.
#[derive(Debug, Clone)]
pub struct RecoveredEntry {
    pub name: String,
    pub method: CompressionMethod,
    /// Method tag for the listing, e.g. "Stored" or "Defl:N".
    pub method_tag: &'static str,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
}

/// Percentage of space saved by compression.
///
/// `100 - compressed * 100 / uncompressed`, truncating. Zero-length
/// entries report 0% rather than dividing by zero; entries that grew
/// under compression report a negative ratio.
pub fn compression_ratio(uncompressed: u64, compressed: u64) -> i64 {
    if uncompressed == 0 {
        return 0;
    }
    100 - (compressed * 100 / uncompressed) as i64
}

/// Listing tag for an entry's compression method.
///
/// Deflate entries carry the producer's effort level in flag bits 1-2.
pub fn method_tag(header: &LocalFileHeader) -> &'static str {
    match header.method {
        CompressionMethod::Stored => "Stored",
        CompressionMethod::Deflate => match (header.flags & 0x06) >> 1 {
            0 => "Defl:N",
            1 => "Defl:X",
            2 => "Defl:F",
            _ => "Defl:S",
        },
        CompressionMethod::Unknown(_) => "Unkn",
    }
}

/// Format one listing line for a recovered entry.
pub fn format_line(entry: &RecoveredEntry) -> String {
    let ratio = compression_ratio(entry.uncompressed_size, entry.compressed_size);
    format!(
        "{:>8}  {:>6}  {:>8}  {:>2}%  {:08x}  {}",
        entry.uncompressed_size,
        entry.method_tag,
        entry.compressed_size,
        ratio,
        entry.crc32,
        entry.name
    )
}
