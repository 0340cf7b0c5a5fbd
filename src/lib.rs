//! # fastqube
//!
//! A compact fixed-width binary codec for FASTQ sequencing records.
//!
//! A packed stream is a 4096-byte text header followed by one record per read, in input
//! order. Each record holds the sequence length, a zero-padded identifier, the bit-packed
//! bases (3 bits lossless, 2 bits lossy) and the bit-packed qualities (6 bits raw, 3 bits
//! block-quantized).
//!
//! ```
//! use fastqube::{CompressOptions, FastqubeWriterBuilder, RefRead, Result, StreamReader};
//!
//! # fn main() -> Result<()> {
//! let mut writer = FastqubeWriterBuilder::default()
//!     .options(CompressOptions::default())
//!     .build(Vec::new())?;
//! writer.write_read(&RefRead::new(b"read1", b"ACGTN", b"IIII#"))?;
//!
//! let bytes = writer.into_inner();
//! let mut reader = StreamReader::new(bytes.as_slice());
//! let read = reader.next_record().unwrap()?;
//! assert_eq!(read.seq, b"ACGTN");
//! # Ok(())
//! # }
//! ```

mod decoder;
pub mod encoder;
mod error;
pub mod fastq;
mod header;
pub mod nuc;
mod options;
pub mod pack;
mod policy;
pub mod quality;
mod reader;
mod record;
mod utils;
mod writer;

pub use decoder::{Decoder, SIZE_PREFIX};
pub use encoder::Encoder;
pub use error::{
    ConfigError, Error, Field, HeaderError, PackError, ReadError, Result, WriteError,
};
pub use header::{FileHeader, SIZE_HEADER};
pub use nuc::BaseEncoding;
pub use options::{CompressOptions, CompressOptionsBuilder, RecordLayout, DEFAULT_ID_CAPACITY};
pub use policy::Policy;
pub use quality::QualityEncoding;
pub use reader::{MmapReader, MmapRecords, StreamReader};
pub use record::{FastqRead, Read, RefRead};
pub use writer::{FastqubeWriter, FastqubeWriterBuilder};
