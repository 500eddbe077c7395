//! # zipsalvage
//!
//! Recover member files from ZIP archives whose central directory is
//! missing, truncated, or unreadable.
//!
//! A ZIP file's authoritative index is written last, so an archive whose
//! writer was killed (or is still running) has every entry's local header
//! and payload on disk but no directory to find them with. This library
//! rebuilds the file list by scanning local file headers sequentially
//! from the start of the stream, decoding each payload in place, and
//! stopping cleanly at the first structural anomaly.
//!
//! ## Features
//!
//! - List, extract, or repack recovered entries
//! - STORED and DEFLATE compression methods
//! - Data descriptors (streamed entries with sizes unknown at write
//!   time), with or without their signature, 32-bit or ZIP64 layout
//! - Partial recoveries keep everything decoded before the failure
//!
//! ## Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::Cursor;
//! use zipsalvage::{ScanSession, Sink};
//!
//! fn main() -> anyhow::Result<()> {
//!     let input = File::open("broken.zip")?;
//!
//!     // List what can be recovered without writing anything.
//!     let sink: Sink<Cursor<Vec<u8>>> = Sink::List;
//!     let mut session = ScanSession::new(input, sink, false);
//!     while let Some(entry) = session.next_entry()? {
//!         println!("{}", entry.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod zip;

pub use crate::cli::Cli;
pub use crate::zip::{
    CompressionMethod, RecoveredEntry, ScanError, ScanSession, Sink, Termination,
};
