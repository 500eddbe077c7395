use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal scan failures.
///
/// Every variant terminates the scan immediately; none are retried.
/// Entries recovered before the failure are already flushed to their
/// destination and remain usable. The two graceful endings (central
/// directory reached, malformed header at an entry boundary) are not
/// errors - see [`Termination`].
#[derive(Debug, Error)]
pub enum ScanError {
    /// Only Stored and Deflate payloads can be recovered.
    #[error("unsupported compression method {0}")]
    UnsupportedMethod(u16),

    /// A stored entry with no recorded size has no findable end: raw
    /// bytes carry no terminator, so recovery cannot continue past it.
    #[error("stored entry {0} has no recorded length")]
    MissingLength(String),

    /// Short read inside a fixed-size structure or a declared-length
    /// payload.
    #[error("truncated {what}: {source}")]
    TruncatedRead {
        what: &'static str,
        source: io::Error,
    },

    /// Corrupt deflate payload. The entry's partial output has been
    /// cleaned up by the time this propagates.
    #[error("cannot decode {name}: {source}")]
    DecodeFailure {
        name: String,
        source: io::Error,
    },

    #[error("cannot create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        source: io::Error,
    },

    #[error("output archive: {0}")]
    Repack(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// How a scan ended without a fatal error.
///
/// All three are expected endings: the true extent of a broken archive
/// is unknown in advance, so running off the end of the entry sequence
/// is the normal way to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The central directory signature was reached intact.
    CentralDirectory,
    /// The next record starts with neither known signature - most likely
    /// the true end of a broken archive.
    MalformedHeader(u32),
    /// The stream ended at an entry boundary.
    Truncated,
}
