//! Header module for the fastqube library
//!
//! Every packed stream starts with a fixed-size, human-readable header block describing the
//! codec parameters in effect. The block is UTF-8 text right-padded with zero bytes:
//!
//! ```text
//! Program: fastqube
//! Version: 0.1.0
//! Mode: LOSSLESS
//! Encoding:
//!     Sequence: 3 bit
//!     Qualities: 6 bit
//! Capacities:
//!     Header: 4096 bytes
//!     Read IDs: 64 bytes
//! Layout: length-prefixed
//! Date: 2026-10-16T09:30:00Z
//! ```
//!
//! (nested lines are indented with a single tab)

use std::io::{Read, Write};

use crate::error::{HeaderError, Result};
use crate::nuc::BaseEncoding;
use crate::options::{CompressOptions, RecordLayout};
use crate::quality::QualityEncoding;
use crate::utils::utc_timestamp;

/// Size of the header in bytes
pub const SIZE_HEADER: usize = 4096;

/// Program name written to and expected in the header
pub const PROGRAM: &str = "fastqube";

/// Program version written to the header
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Mode written to the header
pub const MODE: &str = "LOSSLESS";

/// Header of a packed stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Version of the program that wrote the stream
    pub version: String,

    /// Options the records were encoded with
    pub options: CompressOptions,

    /// UTC time the stream was started
    pub date: String,
}
impl FileHeader {
    /// Creates a header for `options`, stamped with the current UTC time
    #[must_use]
    pub fn new(options: CompressOptions) -> Self {
        Self::with_date(options, utc_timestamp())
    }

    /// Creates a header with a fixed date string
    ///
    /// Useful for reproducible output.
    #[must_use]
    pub fn with_date(options: CompressOptions, date: impl Into<String>) -> Self {
        Self {
            version: VERSION.to_string(),
            options,
            date: date.into(),
        }
    }

    /// Renders the header text without padding
    #[must_use]
    pub fn render(&self) -> String {
        let base_note = if self.options.base.is_lossless() {
            ""
        } else {
            " (lossy)"
        };
        let qual_note = if self.options.quality.is_lossless() {
            ""
        } else {
            " (lossy)"
        };
        format!(
            "Program: {PROGRAM}\n\
             Version: {}\n\
             Mode: {MODE}\n\
             Encoding:\n\
             \tSequence: {} bit{base_note}\n\
             \tQualities: {} bit{qual_note}\n\
             Capacities:\n\
             \tHeader: {SIZE_HEADER} bytes\n\
             \tRead IDs: {} bytes\n\
             Layout: {}\n\
             Date: {}\n",
            self.version,
            self.options.bits_per_base(),
            self.options.bits_per_qual(),
            self.options.id_capacity,
            self.options.layout.as_str(),
            self.date,
        )
    }

    /// Renders the header into exactly [`SIZE_HEADER`] bytes
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::HeaderTooLarge`] if the rendered text does not fit.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = self.render().into_bytes();
        if bytes.len() > SIZE_HEADER {
            return Err(HeaderError::HeaderTooLarge {
                len: bytes.len(),
                capacity: SIZE_HEADER,
            }
            .into());
        }
        bytes.resize(SIZE_HEADER, 0);
        Ok(bytes)
    }

    /// Writes the padded header block to a writer
    pub fn write_bytes<W: Write>(&self, writer: &mut W) -> Result<()> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Parses a header from an arbitrarily sized buffer
    ///
    /// Only the first [`SIZE_HEADER`] bytes are considered.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The buffer is smaller than `SIZE_HEADER`
    /// * The text is not UTF-8
    /// * The program name is not `fastqube`
    /// * A required field is missing or unreadable
    pub fn from_buffer(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < SIZE_HEADER {
            return Err(HeaderError::InvalidSize(buffer.len(), SIZE_HEADER).into());
        }
        Self::from_bytes(&buffer[..SIZE_HEADER])
    }

    /// Parses a header from exactly [`SIZE_HEADER`] bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SIZE_HEADER {
            return Err(HeaderError::InvalidSize(bytes.len(), SIZE_HEADER).into());
        }
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let text = std::str::from_utf8(&bytes[..end])?;

        let mut fields = HeaderFields::default();
        for line in text.lines() {
            let Some((key, value)) = line.trim().split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "Program" => fields.program = Some(value),
                "Version" => fields.version = Some(value),
                "Sequence" => fields.sequence = Some(value),
                "Qualities" => fields.qualities = Some(value),
                "Read IDs" => fields.ids = Some(value),
                "Layout" => fields.layout = Some(value),
                "Date" => fields.date = Some(value),
                _ => {}
            }
        }
        fields.into_header()
    }

    /// Reads and parses a header from a reader
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buffer = vec![0u8; SIZE_HEADER];
        reader.read_exact(&mut buffer)?;
        Self::from_bytes(&buffer)
    }
}

#[derive(Default)]
struct HeaderFields<'a> {
    program: Option<&'a str>,
    version: Option<&'a str>,
    sequence: Option<&'a str>,
    qualities: Option<&'a str>,
    ids: Option<&'a str>,
    layout: Option<&'a str>,
    date: Option<&'a str>,
}
impl HeaderFields<'_> {
    fn into_header(self) -> Result<FileHeader> {
        let program = self.program.ok_or(HeaderError::MissingField("Program"))?;
        if program != PROGRAM {
            return Err(HeaderError::InvalidProgram(program.to_string()).into());
        }
        let version = self.version.ok_or(HeaderError::MissingField("Version"))?;

        let sequence = self.sequence.ok_or(HeaderError::MissingField("Sequence"))?;
        let base = parse_quantity(sequence, "bit")
            .and_then(|bits| u8::try_from(bits).ok())
            .and_then(|bits| BaseEncoding::from_bits(bits).ok())
            .ok_or_else(|| invalid("Sequence", sequence))?;

        let qualities = self.qualities.ok_or(HeaderError::MissingField("Qualities"))?;
        let quality = parse_quantity(qualities, "bit")
            .and_then(|bits| u8::try_from(bits).ok())
            .and_then(|bits| QualityEncoding::from_bits(bits).ok())
            .ok_or_else(|| invalid("Qualities", qualities))?;

        let ids = self.ids.ok_or(HeaderError::MissingField("Read IDs"))?;
        let id_capacity = parse_quantity(ids, "bytes").ok_or_else(|| invalid("Read IDs", ids))?;

        // streams predating the layout line were written without length prefixes
        let layout = match self.layout {
            Some(name) => RecordLayout::from_name(name).ok_or_else(|| invalid("Layout", name))?,
            None => RecordLayout::Bare,
        };

        Ok(FileHeader {
            version: version.to_string(),
            options: CompressOptions {
                base,
                quality,
                id_capacity,
                layout,
            },
            date: self.date.unwrap_or_default().to_string(),
        })
    }
}

/// Parses values such as `3 bit (lossy)` or `64 bytes`
fn parse_quantity(value: &str, unit: &str) -> Option<usize> {
    let mut parts = value.split_whitespace();
    let number = parts.next()?.parse().ok()?;
    (parts.next()? == unit).then_some(number)
}

fn invalid(field: &'static str, value: &str) -> HeaderError {
    HeaderError::InvalidField {
        field,
        value: value.to_string(),
    }
}
