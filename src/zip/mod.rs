//! Broken-archive scanning and recovery.
//!
//! This module recovers entries from ZIP files whose central directory is
//! missing, truncated, or unreadable - typically because the writing
//! process was killed or is still running.
//!
//! ## Architecture
//!
//! The module is organized into five components:
//!
//! - [`structures`]: on-wire records (local file header, data descriptor)
//! - [`scanner`]: the sequential scan session driving recovery
//! - [`sink`]: per-run output destinations (list, extract, repack)
//! - [`report`]: listing-line formatting for recovered entries
//! - [`error`]: the scan's error and termination taxonomy
//!
//! ## Recovery Strategy
//!
//! A well-formed ZIP file is read from its trailing central directory,
//! but a broken one has nothing useful at the end. Instead the scanner
//! reads forward from offset 0:
//!
//! 1. Each entry starts with a 30-byte local file header; decode it
//! 2. Consume exactly the entry's payload, decoding it into the sink
//! 3. If sizes were deferred, resolve the trailing data descriptor
//! 4. Repeat until the central directory signature (clean end), a
//!    malformed header, or the end of the stream
//!
//! The cursor never rewinds and the scanner never searches for the next
//! signature after a failure: entries recovered before the stopping point
//! are kept, everything after it is abandoned.
//!
//! ## Supported Features
//!
//! - STORED (no compression) and DEFLATE payloads
//! - Data descriptors with or without their magic signature, in both the
//!   32-bit and the ZIP64 64-bit size layout
//!
//! ## Limitations
//!
//! - No encryption support
//! - No BZIP2, LZMA, or other compression methods
//! - Entries after a corrupt structure are unrecoverable by design

pub mod error;
pub mod report;
pub mod scanner;
pub mod sink;
pub mod structures;

pub use error::{ScanError, Termination};
pub use report::RecoveredEntry;
pub use scanner::ScanSession;
pub use sink::Sink;
pub use structures::{CompressionMethod, DataDescriptor, LocalFileHeader};
