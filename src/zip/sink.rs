//! Output destinations for recovered entries.
//!
//! One destination is selected per run, not per entry: discard (listing),
//! the filesystem, or a fresh output archive. Each recovered entry goes
//! through the same begin / receive bytes / finish-or-abort cycle, which
//! is what lets a decode failure clean up the one partial entry while
//! leaving everything recovered before it in place.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::zip::error::ScanError;

/// Where decoded entry bytes go for the duration of one scan.
pub enum Sink<W: Write + Seek> {
    /// Decode and discard; used for listing.
    List,
    /// Write each entry to disk under `root`, creating parent
    /// directories as needed.
    Extract { root: PathBuf, overwrite: bool },
    /// Re-archive each entry into a fresh, valid ZIP file.
    Repack { writer: ZipWriter<W> },
}

impl<W: Write + Seek> Sink<W> {
    /// Open the destination for one entry, before its payload is decoded.
    ///
    /// Directory entries (stored name ending in '/') create the directory
    /// and discard their empty payload.
    pub fn begin_entry(
        &mut self,
        name: &str,
        is_directory: bool,
    ) -> Result<EntryWriter<'_, W>, ScanError> {
        match self {
            Sink::List => Ok(EntryWriter::Discard),
            Sink::Extract { root, overwrite } => {
                let path = root.join(name);
                if is_directory {
                    fs::create_dir_all(&path).map_err(|source| ScanError::Create {
                        path: path.clone(),
                        source,
                    })?;
                    return Ok(EntryWriter::Discard);
                }

                println!("inflating: {name}");
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).map_err(|source| ScanError::Create {
                            path: parent.to_path_buf(),
                            source,
                        })?;
                    }
                }

                let file = open_output(&path, *overwrite).map_err(|source| {
                    ScanError::Create {
                        path: path.clone(),
                        source,
                    }
                })?;
                Ok(EntryWriter::File { file, path })
            }
            Sink::Repack { writer } => {
                let options =
                    SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
                if is_directory {
                    writer.add_directory(name, options)?;
                    return Ok(EntryWriter::Discard);
                }

                println!("adding: {name}");
                writer.start_file(name, options)?;
                Ok(EntryWriter::Archive(writer))
            }
        }
    }

    /// Finalize the destination at the end of the run.
    ///
    /// For repack this writes the output archive's central directory and
    /// hands back the inner writer; the other destinations have nothing
    /// to flush.
    pub fn finish(self) -> Result<Option<W>, ScanError> {
        match self {
            Sink::List | Sink::Extract { .. } => Ok(None),
            Sink::Repack { writer } => Ok(Some(writer.finish()?)),
        }
    }
}

fn open_output(path: &Path, overwrite: bool) -> io::Result<File> {
    if overwrite {
        File::create(path)
    } else {
        OpenOptions::new().write(true).create_new(true).open(path)
    }
}

/// Destination for one entry's decoded bytes.
pub enum EntryWriter<'a, W: Write + Seek> {
    Discard,
    File { file: File, path: PathBuf },
    Archive(&'a mut ZipWriter<W>),
}

impl<W: Write + Seek> EntryWriter<'_, W> {
    /// Close out a fully decoded entry.
    pub fn finish(self) -> Result<(), ScanError> {
        match self {
            EntryWriter::Discard => Ok(()),
            EntryWriter::File { mut file, .. } => Ok(file.flush()?),
            // The archive entry is closed by the writer's next operation.
            EntryWriter::Archive(_) => Ok(()),
        }
    }

    /// Discard a partially written entry after a decode failure.
    ///
    /// Best effort: the scan is already terminating with the decode
    /// error, so cleanup failures are not reported over it.
    pub fn abort(self) {
        match self {
            EntryWriter::Discard => {}
            EntryWriter::File { file, path } => {
                drop(file);
                let _ = fs::remove_file(&path);
            }
            EntryWriter::Archive(writer) => {
                let _ = writer.abort_file();
            }
        }
    }
}

impl<W: Write + Seek> Write for EntryWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            EntryWriter::Discard => Ok(buf.len()),
            EntryWriter::File { file, .. } => file.write(buf),
            EntryWriter::Archive(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            EntryWriter::Discard => Ok(()),
            EntryWriter::File { file, .. } => file.flush(),
            EntryWriter::Archive(writer) => writer.flush(),
        }
    }
}
