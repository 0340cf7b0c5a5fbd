use std::fmt;

/// Custom Result type for fastqube operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the fastqube library, encompassing all possible error cases
/// that can occur while encoding or decoding packed FASTQ streams.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors raised while validating compression options
    ConfigError(#[from] ConfigError),
    /// Errors related to rendering or parsing the stream header
    HeaderError(#[from] HeaderError),
    /// Errors raised by the bit packer outside of a record context
    PackError(#[from] PackError),
    /// Errors that occur during read operations
    ReadError(#[from] ReadError),
    /// Errors that occur during write operations
    WriteError(#[from] WriteError),
    /// Standard I/O errors from the Rust standard library
    IoError(#[from] std::io::Error),
    /// UTF-8 encoding/decoding errors
    Utf8Error(#[from] std::str::Utf8Error),
    /// Errors from the FASTQ parser
    FastqError(#[from] seq_io::fastq::Error),
    /// Errors from detecting or opening a compressed input
    NifflerError(#[from] niffler::Error),
}
impl Error {
    /// Returns true if the error is tied to a single record and leaves the stream intact.
    ///
    /// These are the errors a [`Policy::Skip`](crate::Policy::Skip) writer is allowed to
    /// step over.
    #[must_use]
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Self::WriteError(
                WriteError::MalformedRecord { .. }
                    | WriteError::IdentifierTooLarge { .. }
                    | WriteError::EncodingOverflow { .. }
            )
        )
    }
}

/// The part of a read an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Identifier,
    Sequence,
    Quality,
}
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier => write!(f, "identifier"),
            Self::Sequence => write!(f, "sequence"),
            Self::Quality => write!(f, "quality"),
        }
    }
}

/// Errors raised while building [`CompressOptions`](crate::CompressOptions)
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A bit width outside the supported set was requested
    ///
    /// # Fields
    /// * `field` - The field the width applies to
    /// * `bits` - The requested width
    #[error("Unsupported bit width for {field}: {bits}")]
    UnsupportedBitWidth { field: Field, bits: u8 },
}

/// Errors specific to rendering and parsing the stream header
#[derive(thiserror::Error, Debug)]
pub enum HeaderError {
    /// The rendered header text does not fit in the fixed header block
    ///
    /// # Fields
    /// * `len` - The rendered length in bytes
    /// * `capacity` - The fixed capacity of the header block
    #[error("Header text ({len} bytes) exceeds the header capacity ({capacity} bytes)")]
    HeaderTooLarge { len: usize, capacity: usize },

    /// The size of the data does not match the fixed header size
    ///
    /// # Arguments
    /// * First `usize` - The actual number of bytes provided
    /// * Second `usize` - The expected number of bytes
    #[error("Invalid number of bytes provided: {0}. Expected: {1}")]
    InvalidSize(usize, usize),

    /// The header does not name this program
    #[error("Not a fastqube header (program: {0:?})")]
    InvalidProgram(String),

    /// A required header line is absent
    #[error("Missing header field: {0}")]
    MissingField(&'static str),

    /// A header line could not be interpreted
    #[error("Invalid value for header field {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

/// Errors raised by the bit packer
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackError {
    /// Item widths must be between 1 and 8 bits
    #[error("Bit width must be between 1 and 8, got {0}")]
    UnsupportedWidth(u8),

    /// An item does not fit in the requested width
    #[error("Value {value} does not fit in {bits} bits")]
    Overflow { value: u8, bits: u8 },

    /// The packed input holds fewer bytes than the item count requires
    #[error("Packed input holds {got} bytes, {expected} required")]
    Truncated { expected: usize, got: usize },
}

/// Errors that can occur while reading packed streams
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    /// The file being read is not a regular file (e.g., it might be a directory or special file)
    #[error("File is not regular")]
    IncompatibleFile,

    /// The stream carries no per-record length prefix and cannot be split into records
    #[error("Stream was written without length prefixes and cannot be decoded")]
    UnframedStream,

    /// The stream ended inside a record
    ///
    /// # Fields
    /// * `index` - The 0-based index of the incomplete record
    #[error("Record {index} is truncated")]
    TruncatedRecord { index: u64 },

    /// End of stream reached while reading the header
    #[error("End of stream reached")]
    EndOfStream,
}

/// Errors that can occur while encoding and writing records
#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    /// A read is structurally invalid
    ///
    /// # Fields
    /// * `index` - The 0-based index of the offending record
    /// * `reason` - What is wrong with it
    #[error("Malformed record {index}: {reason}")]
    MalformedRecord { index: u64, reason: String },

    /// The identifier is longer than the configured identifier field
    ///
    /// # Fields
    /// * `index` - The 0-based index of the offending record
    /// * `len` - The identifier length in bytes
    /// * `capacity` - The identifier field capacity in bytes
    #[error("Identifier of record {index} is {len} bytes, capacity is {capacity}")]
    IdentifierTooLarge { index: u64, len: usize, capacity: usize },

    /// A symbol code does not fit in the configured bit width
    ///
    /// # Fields
    /// * `index` - The 0-based index of the offending record
    /// * `field` - The field that overflowed
    /// * `value` - The offending code or score
    /// * `bits` - The configured width
    #[error("Record {index}: {field} value {value} does not fit in {bits} bits")]
    EncodingOverflow {
        index: u64,
        field: Field,
        value: i32,
        bits: u8,
    },

    /// Attempted to build a writer without compression options
    #[error("Missing compression options in writer builder")]
    MissingOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_classification() {
        let err: Error = WriteError::IdentifierTooLarge {
            index: 3,
            len: 10,
            capacity: 4,
        }
        .into();
        assert!(err.is_record_error());

        let err: Error = HeaderError::HeaderTooLarge {
            len: 5000,
            capacity: 4096,
        }
        .into();
        assert!(!err.is_record_error());

        let err: Error = std::io::Error::other("sink closed").into();
        assert!(!err.is_record_error());
    }

    #[test]
    fn test_messages_carry_context() {
        let err: Error = WriteError::EncodingOverflow {
            index: 7,
            field: Field::Quality,
            value: 70,
            bits: 6,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Record 7: quality value 70 does not fit in 6 bits"
        );
    }
}
