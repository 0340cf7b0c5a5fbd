//! Packed stream writer
//!
//! The writer emits the header block once and then one packed record per read, in the order
//! the reads are handed to it. Records that fail to encode are handled according to the
//! configured [`Policy`]; a failed record never leaves partial bytes in the output.

use std::io::Write;

use log::debug;

use crate::encoder::Encoder;
use crate::error::{Result, WriteError};
use crate::header::FileHeader;
use crate::options::CompressOptions;
use crate::record::FastqRead;
use crate::Policy;

/// Builder for creating configured `FastqubeWriter` instances
///
/// # Examples
///
/// ```
/// # use fastqube::{CompressOptions, FastqubeWriterBuilder, Policy, RefRead, Result};
/// # fn main() -> Result<()> {
/// let options = CompressOptions::builder().id_capacity(16).build()?;
/// let mut writer = FastqubeWriterBuilder::default()
///     .options(options)
///     .policy(Policy::Skip)
///     .build(Vec::new())?;
/// writer.write_read(&RefRead::new(b"read1", b"ACGT", b"IIII"))?;
/// let bytes = writer.into_inner();
/// assert_eq!(bytes.len(), 4096 + options.record_size(4));
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct FastqubeWriterBuilder {
    /// Required compression options
    options: Option<CompressOptions>,
    /// Optional policy for records that fail to encode
    policy: Option<Policy>,
    /// Optional headless mode for writers whose output is ingested elsewhere
    headless: Option<bool>,
    /// Optional fixed header date
    date: Option<String>,
}
impl FastqubeWriterBuilder {
    #[must_use]
    pub fn options(mut self, options: CompressOptions) -> Self {
        self.options = Some(options);
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = Some(policy);
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = Some(headless);
        self
    }

    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn build<W: Write>(self, inner: W) -> Result<FastqubeWriter<W>> {
        let Some(options) = self.options else {
            return Err(WriteError::MissingOptions.into());
        };
        let header = match self.date {
            Some(date) => FileHeader::with_date(options, date),
            None => FileHeader::new(options),
        };
        FastqubeWriter::new(
            inner,
            header,
            self.policy.unwrap_or_default(),
            self.headless.unwrap_or(false),
        )
    }
}

/// Writer for packed FASTQ streams
///
/// # Type Parameters
///
/// * `W` - The underlying writer type that implements `Write`
pub struct FastqubeWriter<W: Write> {
    /// The underlying writer for output
    inner: W,

    /// Header written at the start of the stream
    header: FileHeader,

    /// Encoder for converting reads to packed records
    encoder: Encoder,

    /// Policy for records that fail to encode
    policy: Policy,

    /// Whether the header was withheld from the output
    headless: bool,

    /// Number of reads handed to the writer, written or not
    records_seen: u64,

    /// Number of records written
    records_written: u64,
}
impl<W: Write> FastqubeWriter<W> {
    /// Creates a new writer and emits the header unless `headless` is set
    ///
    /// This is a low-level constructor. For a more convenient way to create a
    /// `FastqubeWriter`, use the `FastqubeWriterBuilder` struct.
    ///
    /// # Errors
    ///
    /// Fails if the header does not fit its block or cannot be written.
    pub fn new(mut inner: W, header: FileHeader, policy: Policy, headless: bool) -> Result<Self> {
        if !headless {
            header.write_bytes(&mut inner)?;
        }
        debug!(
            "Writing stream: {} bit bases, {} bit qualities, {} byte ids, {} layout",
            header.options.bits_per_base(),
            header.options.bits_per_qual(),
            header.options.id_capacity,
            header.options.layout.as_str(),
        );
        Ok(Self {
            inner,
            encoder: Encoder::new(header.options),
            header,
            policy,
            headless,
            records_seen: 0,
            records_written: 0,
        })
    }

    /// Encodes and writes a single read
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if the record was written
    /// * `Ok(false)` if the record failed to encode and the policy skipped it
    /// * `Err(_)` if the record failed under [`Policy::Abort`] or the sink failed
    pub fn write_read<R: FastqRead>(&mut self, read: &R) -> Result<bool> {
        let index = self.records_seen;
        self.records_seen += 1;
        match self.encoder.encode(index, read) {
            Ok(record) => {
                self.inner.write_all(record)?;
                self.records_written += 1;
                Ok(true)
            }
            Err(e) => self.policy.handle(e),
        }
    }

    /// Returns the header of the stream
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Returns the options records are encoded with
    pub fn options(&self) -> CompressOptions {
        self.header.options
    }

    /// Number of records written so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Number of reads skipped by the policy so far
    pub fn records_skipped(&self) -> u64 {
        self.records_seen - self.records_written
    }

    /// Creates a new encoder with the same options as this writer
    ///
    /// Encoders are independent of each other and of the writer.
    pub fn new_encoder(&self) -> Encoder {
        Encoder::new(self.header.options)
    }

    /// Consumes the writer and returns the underlying writer
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Gets a mutable reference to the underlying writer
    pub fn by_ref(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Flushes any buffered data to the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Checks if this writer is in headless mode
    pub fn is_headless(&self) -> bool {
        self.headless
    }

    /// Appends the records buffered by a headless writer and clears its buffer
    ///
    /// The other writer must have been built with the same options.
    pub fn ingest(&mut self, other: &mut FastqubeWriter<Vec<u8>>) -> Result<()> {
        let other_inner = other.by_ref();
        self.inner.write_all(other_inner)?;
        other_inner.clear();
        self.records_written += other.records_written;
        self.records_seen += other.records_written;
        other.records_seen -= other.records_written;
        other.records_written = 0;
        Ok(())
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::error::Error;
    use crate::header::SIZE_HEADER;
    use crate::record::RefRead;

    #[test]
    fn test_headless() -> Result<()> {
        let mut writer = FastqubeWriterBuilder::default()
            .options(CompressOptions::default())
            .headless(true)
            .build(Vec::new())?;
        assert!(writer.is_headless());
        assert!(writer.by_ref().is_empty());
        Ok(())
    }

    #[test]
    fn test_not_headless() -> Result<()> {
        let mut writer = FastqubeWriterBuilder::default()
            .options(CompressOptions::default())
            .build(Vec::new())?;
        assert!(!writer.is_headless());
        assert_eq!(writer.by_ref().len(), SIZE_HEADER);
        Ok(())
    }

    #[test]
    fn test_missing_options() {
        let result = FastqubeWriterBuilder::default().build(Vec::new());
        assert!(matches!(
            result,
            Err(Error::WriteError(WriteError::MissingOptions))
        ));
    }

    #[test]
    fn test_records_in_order() -> Result<()> {
        let options = CompressOptions::builder().id_capacity(2).build()?;
        let mut writer = FastqubeWriterBuilder::default()
            .options(options)
            .headless(true)
            .build(Vec::new())?;
        writer.write_read(&RefRead::new(b"r1", b"A", b"!"))?;
        writer.write_read(&RefRead::new(b"r2", b"T", b"!"))?;
        assert_eq!(writer.records_written(), 2);

        let bytes = writer.into_inner();
        assert_eq!(
            bytes,
            vec![1, 0, 0, 0, b'r', b'1', 0x00, 0x00, 1, 0, 0, 0, b'r', b'2', 0x20, 0x00]
        );
        Ok(())
    }

    #[test]
    fn test_abort_policy() -> Result<()> {
        let mut writer = FastqubeWriterBuilder::default()
            .options(CompressOptions::builder().id_capacity(2).build()?)
            .headless(true)
            .build(Vec::new())?;
        writer.write_read(&RefRead::new(b"r1", b"A", b"!"))?;
        let err = writer
            .write_read(&RefRead::new(b"long", b"A", b"!"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::WriteError(WriteError::IdentifierTooLarge { index: 1, .. })
        ));
        assert_eq!(writer.records_written(), 1);
        Ok(())
    }

    #[test]
    fn test_skip_policy() -> Result<()> {
        let options = CompressOptions::builder().id_capacity(2).build()?;
        let mut writer = FastqubeWriterBuilder::default()
            .options(options)
            .policy(Policy::Skip)
            .headless(true)
            .build(Vec::new())?;
        assert!(writer.write_read(&RefRead::new(b"r1", b"A", b"!"))?);
        assert!(!writer.write_read(&RefRead::new(b"long", b"A", b"!"))?);
        assert!(!writer.write_read(&RefRead::new(b"r3", b"AA", b"!"))?);
        assert!(writer.write_read(&RefRead::new(b"r4", b"A", b"!"))?);
        assert_eq!(writer.records_written(), 2);
        assert_eq!(writer.records_skipped(), 2);
        assert_eq!(writer.into_inner().len(), 2 * options.record_size(1));
        Ok(())
    }

    #[test]
    fn test_new_encoder_matches_writer() -> Result<()> {
        let options = CompressOptions::builder().id_capacity(8).build()?;
        let mut writer = FastqubeWriterBuilder::default()
            .options(options)
            .headless(true)
            .build(Vec::new())?;
        let reads = [
            RefRead::new(b"r1", b"ACGTN", b"IIII#"),
            RefRead::new(b"r2", b"GGA", b"+5?"),
        ];

        let mut first = writer.new_encoder();
        let mut second = writer.new_encoder();
        let mut expected = Vec::new();
        for (index, read) in reads.iter().enumerate() {
            writer.write_read(read)?;
            let record = first.encode(index as u64, read)?.to_vec();
            assert_eq!(second.encode(index as u64, read)?, record.as_slice());
            expected.extend_from_slice(&record);
        }
        first.clear();
        assert_eq!(first.encode(1, &reads[1])?, second.encode(1, &reads[1])?);

        assert_eq!(writer.into_inner(), expected);
        Ok(())
    }

    #[test]
    fn test_ingest() -> Result<()> {
        let options = CompressOptions::default();
        let mut main = FastqubeWriterBuilder::default()
            .options(options)
            .date("2026-10-16T00:00:00Z")
            .build(Vec::new())?;
        let mut worker = FastqubeWriterBuilder::default()
            .options(options)
            .headless(true)
            .build(Vec::new())?;

        worker.write_read(&RefRead::new(b"r1", b"ACGT", b"IIII"))?;
        worker.write_read(&RefRead::new(b"r2", b"ACGT", b"IIII"))?;
        main.ingest(&mut worker)?;

        assert!(worker.by_ref().is_empty());
        assert_eq!(worker.records_written(), 0);
        assert_eq!(main.records_written(), 2);
        assert_eq!(
            main.into_inner().len(),
            SIZE_HEADER + 2 * options.record_size(4)
        );
        Ok(())
    }
}
