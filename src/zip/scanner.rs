//! Sequential local-header scanner.
//!
//! This module is the recovery core: it walks a ZIP stream from offset 0,
//! entry by entry, without ever touching the (missing or broken) central
//! directory.
//!
//! ## Scanning Strategy
//!
//! Each iteration of [`ScanSession::next_entry`] performs three steps at
//! the current cursor position:
//!
//! 1. Read and validate one 30-byte local file header plus its
//!    variable-length name and extra field
//! 2. Consume exactly the entry's payload, streaming decoded bytes into
//!    the selected [`Sink`] (stored bytes copied verbatim, deflate
//!    payloads inflated until the bitstream's own end-of-stream marker)
//! 3. If the header deferred its sizes, resolve the trailing data
//!    descriptor and adopt its CRC and sizes
//!
//! The cursor is forward-only and never rewound: the byte count consumed
//! for one entry must equal exactly what the writer emitted for it, or
//! the next header read fails its signature check and the scan ends.
//! That failure is the normal way to find the end of a broken archive.

use std::io::{self, BufRead, BufReader, Read, Seek, Write};

use flate2::{Decompress, FlushDecompress, Status};

use crate::zip::error::{ScanError, Termination};
use crate::zip::report::{method_tag, RecoveredEntry};
use crate::zip::sink::Sink;
use crate::zip::structures::{
    CompressionMethod, DataDescriptor, LocalFileHeader, CDFH_SIGNATURE, LFH_SIGNATURE, LFH_SIZE,
};

/// One recovery run over a broken archive.
///
/// Owns the scan cursor and the output destination for the whole run;
/// entries are recovered strictly in stream order because entry N's
/// offset is only known once entry N-1 is fully consumed.
///
/// ## Example
///
/// ```ignore
/// let mut session = ScanSession::new(input, sink, false);
/// while let Some(entry) = session.next_entry()? {
///     println!("{}", entry.name);
/// }
/// session.finish()?;
/// ```
pub struct ScanSession<R: Read, W: Write + Seek> {
    /// Forward-only scan cursor
    reader: BufReader<R>,
    /// Destination for decoded entry bytes
    sink: Sink<W>,
    /// Dump parsed structures as they are decoded
    debug: bool,
    /// Set once the entry sequence has ended; later calls return `None`
    termination: Option<Termination>,
}

impl<R: Read, W: Write + Seek> ScanSession<R, W> {
    pub fn new(input: R, sink: Sink<W>, debug: bool) -> Self {
        Self {
            reader: BufReader::new(input),
            sink,
            debug,
            termination: None,
        }
    }

    /// How the entry sequence ended, once it has.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Recover the next entry from the stream.
    ///
    /// Returns `Ok(Some(_))` with the entry's authoritative metadata once
    /// its payload has been fully decoded into the sink, `Ok(None)` when
    /// the entry sequence has ended (see [`termination`](Self::termination)
    /// for how), or a fatal [`ScanError`]. After either `Ok(None)` or an
    /// error the scan is over; previously recovered entries are already
    /// flushed to their destination.
    pub fn next_entry(&mut self) -> Result<Option<RecoveredEntry>, ScanError> {
        if self.termination.is_some() {
            return Ok(None);
        }

        // Header Decoder: 30 fixed bytes, then triage on the signature.
        let mut fixed = [0u8; LFH_SIZE];
        if let Err(err) = self.reader.read_exact(&mut fixed) {
            if err.kind() == io::ErrorKind::UnexpectedEof {
                // The stream ended at an entry boundary - the archive was
                // cut off after the previous entry.
                self.termination = Some(Termination::Truncated);
                return Ok(None);
            }
            return Err(err.into());
        }

        let signature = u32::from_le_bytes([fixed[0], fixed[1], fixed[2], fixed[3]]);
        if signature == CDFH_SIGNATURE {
            // Central directory reached: every local entry was recovered.
            self.termination = Some(Termination::CentralDirectory);
            return Ok(None);
        }
        if signature != LFH_SIGNATURE {
            self.termination = Some(Termination::MalformedHeader(signature));
            return Ok(None);
        }

        let mut header = LocalFileHeader::from_bytes(&fixed)?;

        let mut name_bytes = vec![0u8; header.file_name_length as usize];
        self.reader
            .read_exact(&mut name_bytes)
            .map_err(|source| ScanError::TruncatedRead {
                what: "file name",
                source,
            })?;
        header.raw_name = name_bytes;

        // Extra field: consumed for cursor alignment, contents discarded.
        let extra_len = header.extra_field_length as u64;
        if extra_len > 0 {
            let skipped = io::copy(&mut (&mut self.reader).take(extra_len), &mut io::sink())?;
            if skipped < extra_len {
                return Err(ScanError::TruncatedRead {
                    what: "extra field",
                    source: io::ErrorKind::UnexpectedEof.into(),
                });
            }
        }

        if self.debug {
            dump_header(&header);
        }

        let name = header.name().into_owned();

        // Payload Resolver: dispatch on the compression method. The sink
        // destination is opened before decoding starts so a decode
        // failure can clean up the partial output.
        match header.method {
            CompressionMethod::Stored => {
                // Raw bytes have no end marker, so the exact extent must
                // come from the header; a descriptor after the payload is
                // too late to find the payload's end.
                if header.uncompressed_size == 0 {
                    return Err(ScanError::MissingLength(name));
                }

                let mut writer = self.sink.begin_entry(&name, header.is_directory())?;
                let mut limited = (&mut self.reader).take(header.uncompressed_size);
                let copied = io::copy(&mut limited, &mut writer)?;
                if copied < header.uncompressed_size {
                    return Err(ScanError::TruncatedRead {
                        what: "stored entry data",
                        source: io::ErrorKind::UnexpectedEof.into(),
                    });
                }
                if self.debug {
                    println!("read {copied} bytes");
                }
                writer.finish()?;
            }
            CompressionMethod::Deflate => {
                let mut writer = self.sink.begin_entry(&name, header.is_directory())?;
                match inflate_payload(&mut self.reader, &mut writer) {
                    Ok(decoded) => {
                        if self.debug {
                            println!("decoded {decoded} bytes");
                        }
                        writer.finish()?;
                    }
                    Err(source) => {
                        writer.abort();
                        return Err(ScanError::DecodeFailure { name, source });
                    }
                }
            }
            CompressionMethod::Unknown(value) => {
                return Err(ScanError::UnsupportedMethod(value));
            }
        }

        // Descriptor Resolver: the header's CRC and sizes were
        // placeholders, the record after the payload is authoritative.
        if header.has_data_descriptor() {
            let descriptor =
                DataDescriptor::read_from(&mut self.reader, header.uses_zip64_descriptor())?;
            header.crc32 = descriptor.crc32;
            header.compressed_size = descriptor.compressed_size;
            header.uncompressed_size = descriptor.uncompressed_size;

            if self.debug {
                dump_descriptor(&descriptor);
            }
        }

        Ok(Some(RecoveredEntry {
            method_tag: method_tag(&header),
            method: header.method,
            compressed_size: header.compressed_size,
            uncompressed_size: header.uncompressed_size,
            crc32: header.crc32,
            name,
        }))
    }

    /// Finalize the run's destination.
    ///
    /// In repack mode this writes the fresh archive's own central
    /// directory, regardless of how the input scan ended - partial
    /// recoveries still produce a valid output archive. Returns the
    /// repack writer's inner destination, if any.
    pub fn finish(self) -> Result<Option<W>, ScanError> {
        self.sink.finish()
    }
}

/// Inflate one deflate payload from the cursor into the entry writer.
///
/// Consumes only the bytes the inflater actually uses, so the cursor is
/// left exactly at the end of the deflate stream - this is what makes
/// deflate entries recoverable with no declared size at all. Returns the
/// number of decoded bytes.
///
/// A bitstream that ends without its end-of-stream marker, or one with
/// invalid codes, is an error; the caller discards the entry's partial
/// output.
fn inflate_payload<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> io::Result<u64> {
    let mut inflater = Decompress::new(false);
    let mut out = [0u8; 32 * 1024];

    loop {
        let (status, consumed, produced, eof) = {
            let input = reader.fill_buf()?;
            let eof = input.is_empty();
            let before_in = inflater.total_in();
            let before_out = inflater.total_out();
            let status = inflater
                .decompress(input, &mut out, FlushDecompress::None)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            (
                status,
                (inflater.total_in() - before_in) as usize,
                (inflater.total_out() - before_out) as usize,
                eof,
            )
        };

        reader.consume(consumed);
        writer.write_all(&out[..produced])?;

        match status {
            Status::StreamEnd => return Ok(inflater.total_out()),
            _ if eof => return Err(io::ErrorKind::UnexpectedEof.into()),
            _ => {}
        }
    }
}

/// Print the parsed header fields for debug mode.
fn dump_header(header: &LocalFileHeader) {
    println!();
    println!("version {}", header.version_needed);
    println!("flags   {:04x}{}", header.flags, header.flag_summary());
    println!("comp    {:04x}", header.method.as_u16());
    println!("time    {:04x}", header.last_mod_time);
    println!("date    {:04x}", header.last_mod_date);
    println!("crc32   {:08x}", header.crc32);
    println!("compressed size   {}", header.compressed_size);
    println!("uncompressed size {}", header.uncompressed_size);
    println!("filename length   {}", header.file_name_length);
    println!("extra length      {}", header.extra_field_length);
    println!();
    println!("filename {}", header.name());
}

fn dump_descriptor(descriptor: &DataDescriptor) {
    println!();
    if descriptor.has_signature {
        println!("magic   {:08x}", DataDescriptor::SIGNATURE);
    }
    println!("crc32   {:08x}", descriptor.crc32);
    println!("compressed size   {}", descriptor.compressed_size);
    println!("uncompressed size {}", descriptor.uncompressed_size);
}
