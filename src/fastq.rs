//! Whole-stream conversion between FASTQ text and packed streams
//!
//! Input FASTQ may be plain or compressed with any format `niffler` detects; it is parsed
//! with `seq_io`.

use std::io::{self, Write};
use std::path::Path;

use log::debug;
use seq_io::fastq::Reader;

use crate::error::{Result, WriteError};
use crate::reader::StreamReader;
use crate::writer::FastqubeWriter;

/// Record counts of a finished conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Records converted
    pub records: u64,
    /// Records dropped by a [`Policy::Skip`](crate::Policy::Skip) writer
    pub skipped: u64,
}

/// Opens a possibly compressed input, reading stdin when `path` is `-`
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn io::Read>> {
    let path = path.as_ref();
    let (reader, format) = if path == Path::new("-") {
        niffler::get_reader(Box::new(io::stdin()))?
    } else {
        niffler::from_path(path)?
    };
    debug!("Opened {} ({:?})", path.display(), format);
    Ok(reader)
}

/// Packs every FASTQ record of `input` into `writer`, in input order
///
/// Parser errors are always fatal. Records with unequal sequence and quality lengths are
/// reported as [`WriteError::MalformedRecord`].
pub fn compress<R: io::Read, W: Write>(
    input: R,
    writer: &mut FastqubeWriter<W>,
) -> Result<Summary> {
    let mut reader = Reader::new(input);
    while let Some(record) = reader.next() {
        let record = match record {
            Ok(record) => record,
            Err(seq_io::fastq::Error::UnequalLengths { seq, qual, .. }) => {
                return Err(WriteError::MalformedRecord {
                    index: writer.records_written() + writer.records_skipped(),
                    reason: format!(
                        "sequence length ({seq}) does not match quality length ({qual})"
                    ),
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        };
        writer.write_read(&record)?;
    }
    writer.flush()?;

    let summary = Summary {
        records: writer.records_written(),
        skipped: writer.records_skipped(),
    };
    debug!(
        "Packed {} records ({} skipped)",
        summary.records, summary.skipped
    );
    Ok(summary)
}

/// Unpacks a length-prefixed stream into FASTQ text
pub fn decompress<R: io::Read, W: Write>(input: R, mut output: W) -> Result<Summary> {
    let mut reader = StreamReader::new(input);
    reader.read_header()?;
    while let Some(read) = reader.next_record() {
        read?.write_fastq(&mut output)?;
    }
    output.flush()?;

    let summary = Summary {
        records: reader.n_processed(),
        skipped: 0,
    };
    debug!("Unpacked {} records", summary.records);
    Ok(summary)
}
