//! Packed stream readers
//!
//! Two readers are provided:
//! 1. [`StreamReader`] reads records one by one from any source implementing `Read`
//! 2. [`MmapReader`] memory-maps a file and walks its records sequentially
//!
//! Both require length-prefixed streams; records are visited strictly in stream order.

use std::fs::File;
use std::io::{ErrorKind, Read as IoRead};
use std::path::Path;

use log::debug;
use memmap2::Mmap;

use crate::decoder::{Decoder, SIZE_PREFIX};
use crate::error::{Error, ReadError, Result};
use crate::header::{FileHeader, SIZE_HEADER};
use crate::record::Read;

/// A reader for streaming packed records from any source that implements `Read`
///
/// The header is read lazily on the first call to [`next_record`](Self::next_record) or
/// explicitly through [`read_header`](Self::read_header).
pub struct StreamReader<R: IoRead> {
    /// The source reader for packed data
    reader: R,

    /// Stream header, once read
    header: Option<FileHeader>,

    /// Decoder configured from the header
    decoder: Option<Decoder>,

    /// Buffer holding the bytes of the current record
    buffer: Vec<u8>,

    /// The last decoded read
    record: Read,

    /// Number of records decoded
    n_processed: u64,
}
impl<R: IoRead> StreamReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            header: None,
            decoder: None,
            buffer: Vec::new(),
            record: Read::default(),
            n_processed: 0,
        }
    }

    /// Reads and validates the header from the underlying reader
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The stream ends before the header block is complete
    /// * The header is invalid
    /// * The stream was written without length prefixes
    pub fn read_header(&mut self) -> Result<&FileHeader> {
        let header = match self.header.take() {
            Some(header) => header,
            None => {
                let header = FileHeader::from_reader(&mut self.reader).map_err(|e| match e {
                    Error::IoError(io) if io.kind() == ErrorKind::UnexpectedEof => {
                        ReadError::EndOfStream.into()
                    }
                    other => other,
                })?;
                debug!("Reading stream written by fastqube {}", header.version);
                header
            }
        };

        // keep the header even if its layout is rejected, the bytes are already consumed
        let header = self.header.insert(header);
        if self.decoder.is_none() {
            self.decoder = Some(Decoder::new(header.options)?);
        }
        Ok(header)
    }

    /// Fills `buf` completely, returning `Ok(false)` if the stream ended before the first byte
    fn fill_prefix(&mut self, buf: &mut [u8]) -> Result<bool> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(false),
                Ok(0) => {
                    return Err(ReadError::TruncatedRecord {
                        index: self.n_processed,
                    }
                    .into())
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }

    fn next_inner(&mut self) -> Result<bool> {
        self.read_header()?;

        let mut prefix = [0u8; SIZE_PREFIX];
        if !self.fill_prefix(&mut prefix)? {
            return Ok(false);
        }

        let Some(decoder) = self.decoder.as_mut() else {
            return Err(ReadError::UnframedStream.into());
        };
        let total = decoder.record_size(&prefix);
        self.buffer.clear();
        self.buffer.extend_from_slice(&prefix);

        // grow the buffer only as bytes arrive, the prefix may be corrupt
        let remaining = (total - SIZE_PREFIX) as u64;
        self.reader
            .by_ref()
            .take(remaining)
            .read_to_end(&mut self.buffer)?;
        if self.buffer.len() < total {
            return Err(ReadError::TruncatedRecord {
                index: self.n_processed,
            }
            .into());
        }

        decoder.decode(self.n_processed, &self.buffer, &mut self.record)?;
        self.n_processed += 1;
        Ok(true)
    }

    /// Retrieves the next record from the stream
    ///
    /// # Returns
    ///
    /// * `Some(Ok(read))` - The next record was successfully decoded
    /// * `None` - The stream ended cleanly after the last record
    /// * `Some(Err(_))` - The stream is invalid or truncated
    pub fn next_record(&mut self) -> Option<Result<&Read>> {
        match self.next_inner() {
            Ok(true) => Some(Ok(&self.record)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }

    /// Number of records decoded so far
    pub fn n_processed(&self) -> u64 {
        self.n_processed
    }

    /// Consumes the stream reader and returns the inner reader
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// A memory-mapped reader for packed files
///
/// Records are decoded in stream order through [`records`](Self::records).
///
/// # Example
///
/// ```no_run
/// use fastqube::{MmapReader, Result};
///
/// fn main() -> Result<()> {
///     let reader = MmapReader::new("reads.fqb")?;
///     for read in reader.records() {
///         let read = read?;
///         println!("{}", String::from_utf8_lossy(&read.id));
///     }
///     Ok(())
/// }
/// ```
pub struct MmapReader {
    /// Memory mapped file contents
    mmap: Mmap,

    /// Stream header
    header: FileHeader,
}
impl MmapReader {
    /// Creates a new memory-mapped reader for a packed file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The file cannot be opened
    /// * The file is not a regular file
    /// * The file header is invalid
    /// * The file was written without length prefixes
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        // Verify input file is a file before attempting to map
        let file = File::open(path)?;
        if !file.metadata()?.is_file() {
            return Err(ReadError::IncompatibleFile.into());
        }

        // Safety: the file is open and won't be modified while mapped
        let mmap = unsafe { Mmap::map(&file)? };

        let header = FileHeader::from_buffer(&mmap)?;
        if header.options.layout != crate::RecordLayout::LengthPrefixed {
            return Err(ReadError::UnframedStream.into());
        }
        Ok(Self { mmap, header })
    }

    /// Returns the header of the file
    #[must_use]
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Returns an iterator decoding the records in file order
    pub fn records(&self) -> MmapRecords<'_> {
        MmapRecords {
            bytes: &self.mmap[SIZE_HEADER..],
            // layout was checked on construction
            decoder: Decoder::new(self.header.options).ok(),
            index: 0,
        }
    }

    /// Counts the records in the file by walking their length prefixes
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::TruncatedRecord`] if the last record is incomplete.
    pub fn num_records(&self) -> Result<u64> {
        let decoder = Decoder::new(self.header.options)?;
        let mut bytes = &self.mmap[SIZE_HEADER..];
        let mut count = 0;
        while !bytes.is_empty() {
            if bytes.len() < SIZE_PREFIX {
                return Err(ReadError::TruncatedRecord { index: count }.into());
            }
            let total = decoder.record_size(bytes);
            if bytes.len() < total {
                return Err(ReadError::TruncatedRecord { index: count }.into());
            }
            bytes = &bytes[total..];
            count += 1;
        }
        Ok(count)
    }
}

/// Iterator over the records of a [`MmapReader`]
pub struct MmapRecords<'a> {
    bytes: &'a [u8],
    decoder: Option<Decoder>,
    index: u64,
}
impl Iterator for MmapRecords<'_> {
    type Item = Result<Read>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bytes.is_empty() {
            return None;
        }
        let decoder = self.decoder.as_mut()?;
        let mut read = Read::default();
        match decoder.decode(self.index, self.bytes, &mut read) {
            Ok(consumed) => {
                self.bytes = &self.bytes[consumed..];
                self.index += 1;
                Some(Ok(read))
            }
            Err(e) => {
                // stop after the first error
                self.bytes = &[];
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;
    use crate::options::{CompressOptions, RecordLayout};
    use crate::record::RefRead;
    use crate::writer::FastqubeWriterBuilder;

    fn reads() -> Vec<RefRead<'static>> {
        vec![
            RefRead::new(b"read/1", b"ACGTN", b"IIII#"),
            RefRead::new(b"read/2", b"", b""),
            RefRead::new(b"read/3", b"TTTTTTTTTTGA", b"!!!!!!!!!!JJ"),
        ]
    }

    fn packed(options: CompressOptions) -> Result<Vec<u8>> {
        let mut writer = FastqubeWriterBuilder::default()
            .options(options)
            .build(Vec::new())?;
        for read in reads() {
            writer.write_read(&read)?;
        }
        Ok(writer.into_inner())
    }

    #[test]
    fn test_stream_reader() -> Result<()> {
        let bytes = packed(CompressOptions::default())?;
        let mut reader = StreamReader::new(Cursor::new(bytes));
        assert_eq!(reader.read_header()?.options, CompressOptions::default());

        let mut decoded = Vec::new();
        while let Some(read) = reader.next_record() {
            decoded.push(read?.clone());
        }
        let expected: Vec<Read> = reads().iter().map(RefRead::to_owned_read).collect();
        assert_eq!(decoded, expected);
        assert_eq!(reader.n_processed(), 3);
        Ok(())
    }

    #[test]
    fn test_stream_reader_truncated() -> Result<()> {
        let mut bytes = packed(CompressOptions::default())?;
        bytes.truncate(bytes.len() - 2);
        let mut reader = StreamReader::new(bytes.as_slice());
        assert!(reader.next_record().unwrap().is_ok());
        assert!(reader.next_record().unwrap().is_ok());
        assert!(matches!(
            reader.next_record(),
            Some(Err(Error::ReadError(ReadError::TruncatedRecord { index: 2 })))
        ));
        Ok(())
    }

    #[test]
    fn test_stream_reader_corrupt_prefix() -> Result<()> {
        let mut bytes = FileHeader::new(CompressOptions::default()).to_bytes()?;
        bytes.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF, b'x', b'y']);
        let mut reader = StreamReader::new(bytes.as_slice());
        assert!(matches!(
            reader.next_record(),
            Some(Err(Error::ReadError(ReadError::TruncatedRecord { index: 0 })))
        ));
        Ok(())
    }

    #[test]
    fn test_stream_reader_empty() {
        let mut reader = StreamReader::new(&b""[..]);
        assert!(matches!(
            reader.next_record(),
            Some(Err(Error::ReadError(ReadError::EndOfStream)))
        ));
    }

    #[test]
    fn test_stream_reader_bare() -> Result<()> {
        let options = CompressOptions::builder()
            .layout(RecordLayout::Bare)
            .build()?;
        let bytes = packed(options)?;
        let mut reader = StreamReader::new(bytes.as_slice());
        for _ in 0..2 {
            assert!(matches!(
                reader.next_record(),
                Some(Err(Error::ReadError(ReadError::UnframedStream)))
            ));
        }
        assert!(matches!(
            reader.read_header(),
            Err(Error::ReadError(ReadError::UnframedStream))
        ));
        Ok(())
    }

    #[test]
    fn test_mmap_reader() -> Result<()> {
        let options = CompressOptions::builder().id_capacity(8).build()?;
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(&packed(options)?)?;
        file.flush()?;

        let reader = MmapReader::new(file.path())?;
        assert_eq!(reader.header().options, options);
        assert_eq!(reader.num_records()?, 3);

        let decoded = reader.records().collect::<Result<Vec<_>>>()?;
        let expected: Vec<Read> = reads().iter().map(RefRead::to_owned_read).collect();
        assert_eq!(decoded, expected);
        Ok(())
    }

    #[test]
    fn test_mmap_reader_truncated() -> Result<()> {
        let mut bytes = packed(CompressOptions::default())?;
        bytes.truncate(bytes.len() - 1);
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(&bytes)?;
        file.flush()?;

        let reader = MmapReader::new(file.path())?;
        assert!(reader.num_records().is_err());
        let results: Vec<_> = reader.records().collect();
        assert_eq!(results.len(), 3);
        assert!(results[2].is_err());
        Ok(())
    }
}
