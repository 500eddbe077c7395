//! Main entry point for the zipsalvage CLI application.
//!
//! This binary scans a broken ZIP archive from the start of the stream
//! and lists, extracts, or repacks whatever entries can be recovered.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::process::ExitCode;

use zipsalvage::zip::report;
use zipsalvage::{Cli, ScanError, ScanSession, Sink, Termination};

/// Application entry point.
///
/// Parses command-line arguments, selects the run's output destination,
/// and drives the scan loop. The output container is finalized before
/// any error is reported, so partial recoveries are always usable.
fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let input = File::open(&cli.file).with_context(|| format!("open {}", cli.file))?;
    let sink = build_sink(&cli)?;

    let mut session = ScanSession::new(input, sink, cli.debug);

    // Drive the scan entry by entry. Any error ends the run; the sink
    // is finalized either way.
    let failure = loop {
        match session.next_entry() {
            Ok(Some(entry)) => {
                if cli.list {
                    println!("{}", report::format_line(&entry));
                }
            }
            Ok(None) => break None,
            Err(err) => break Some(err),
        }
    };

    let termination = session.termination();
    session.finish().context("finalize output")?;

    if let Some(err) = failure {
        eprintln!("zipsalvage: {err}");
        return Ok(ExitCode::FAILURE);
    }

    // The graceful endings: reaching the central directory is full
    // success, the other two are the expected end of a broken archive.
    match termination {
        Some(Termination::CentralDirectory) => eprintln!("zipsalvage: found central directory"),
        Some(Termination::MalformedHeader(signature)) => {
            eprintln!("zipsalvage: invalid local header signature {signature:08x}")
        }
        Some(Termination::Truncated) => {
            eprintln!("zipsalvage: stream ended before the next header")
        }
        None => {}
    }

    Ok(ExitCode::SUCCESS)
}

/// Select the run's output destination from the CLI mode.
///
/// The three modes are mutually exclusive: listing discards decoded
/// bytes, extraction writes files under the chosen directory, and
/// repacking streams entries into a fresh archive.
fn build_sink(cli: &Cli) -> Result<Sink<File>, ScanError> {
    if cli.list {
        return Ok(Sink::List);
    }

    if let Some(output) = &cli.output {
        let path = PathBuf::from(output);
        let file = if cli.force {
            File::create(&path)
        } else {
            OpenOptions::new().write(true).create_new(true).open(&path)
        }
        .map_err(|source| ScanError::Create {
            path: path.clone(),
            source,
        })?;

        return Ok(Sink::Repack {
            writer: zip::ZipWriter::new(file),
        });
    }

    let root = cli
        .extract_dir
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(Sink::Extract {
        root,
        overwrite: cli.force,
    })
}
