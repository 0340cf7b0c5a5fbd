//! Record encoding
//!
//! A packed record is laid out as:
//!
//! 1. Sequence length (4 bytes, little-endian `u32`), only in the length-prefixed layout
//! 2. Identifier field (`id_capacity` bytes, zero-padded), only if `id_capacity > 0`
//! 3. Packed sequence (`ceil(L * bits_per_base / 8)` bytes)
//! 4. Packed quality (`ceil(L * bits_per_qual / 8)` bytes)

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{Error, Field, PackError, Result, WriteError};
use crate::options::{CompressOptions, RecordLayout};
use crate::pack::pack;
use crate::record::FastqRead;

/// Appends the identifier zero-padded to exactly `capacity` bytes
///
/// Identifiers longer than the capacity are rejected, never truncated.
///
/// ```
/// let mut field = Vec::new();
/// fastqube::encoder::encode_id(0, b"la", 3, &mut field).unwrap();
/// assert_eq!(field, vec![0x6C, 0x61, 0x00]);
/// assert!(fastqube::encoder::encode_id(0, b"la", 1, &mut field).is_err());
/// ```
pub fn encode_id(index: u64, id: &[u8], capacity: usize, out: &mut Vec<u8>) -> Result<()> {
    if id.len() > capacity {
        return Err(WriteError::IdentifierTooLarge {
            index,
            len: id.len(),
            capacity,
        }
        .into());
    }
    out.extend_from_slice(id);
    out.resize(out.len() + capacity - id.len(), 0);
    Ok(())
}

fn overflow(index: u64, field: Field, err: PackError) -> Error {
    match err {
        PackError::Overflow { value, bits } => WriteError::EncodingOverflow {
            index,
            field,
            value: i32::from(value),
            bits,
        }
        .into(),
        other => other.into(),
    }
}

/// Encodes reads into packed records
///
/// The encoder keeps its options and a scratch buffer for symbol codes. Encoding is a pure
/// function of the read and the options, so a cloned encoder produces identical output.
#[derive(Debug, Clone)]
pub struct Encoder {
    /// Options the records are encoded with
    options: CompressOptions,

    /// Reusable buffer for symbol codes
    codes: Vec<u8>,

    /// Reusable buffer for the last encoded record
    record: Vec<u8>,
}
impl Encoder {
    #[must_use]
    pub fn new(options: CompressOptions) -> Self {
        Self {
            options,
            codes: Vec::new(),
            record: Vec::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> CompressOptions {
        self.options
    }

    /// Encodes a read and returns the packed record
    ///
    /// `index` is the 0-based position of the read in the stream, used for error context.
    pub fn encode<R: FastqRead>(&mut self, index: u64, read: &R) -> Result<&[u8]> {
        let mut record = std::mem::take(&mut self.record);
        record.clear();
        let status = self.encode_into(index, read, &mut record);
        self.record = record;
        status?;
        Ok(&self.record)
    }

    /// Encodes a read and appends the packed record to `out`
    ///
    /// On error `out` is restored to its original length, so no partial record is left behind.
    pub fn encode_into<R: FastqRead>(
        &mut self,
        index: u64,
        read: &R,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        let start = out.len();
        let status = self.encode_parts(index, read, out);
        if status.is_err() {
            out.truncate(start);
        }
        status
    }

    fn encode_parts<R: FastqRead>(&mut self, index: u64, read: &R, out: &mut Vec<u8>) -> Result<()> {
        let (id, seq, qual) = (read.id(), read.seq(), read.qual());
        if seq.len() != qual.len() {
            return Err(WriteError::MalformedRecord {
                index,
                reason: format!(
                    "sequence length ({}) does not match quality length ({})",
                    seq.len(),
                    qual.len()
                ),
            }
            .into());
        }
        if id.iter().any(|&b| b == b'\n' || b == b'\r') {
            return Err(WriteError::MalformedRecord {
                index,
                reason: "identifier contains a line break".to_string(),
            }
            .into());
        }
        // NUL is the identifier padding byte
        if id.contains(&0) {
            return Err(WriteError::MalformedRecord {
                index,
                reason: "identifier contains a NUL byte".to_string(),
            }
            .into());
        }

        if self.options.layout == RecordLayout::LengthPrefixed {
            let Ok(len) = u32::try_from(seq.len()) else {
                return Err(WriteError::MalformedRecord {
                    index,
                    reason: format!("sequence length ({}) exceeds u32", seq.len()),
                }
                .into());
            };
            out.write_u32::<LittleEndian>(len)?;
        }

        if self.options.stores_ids() {
            encode_id(index, id, self.options.id_capacity, out)?;
        }

        self.encode_sequence(index, seq, out)?;
        self.encode_quality(index, qual, out)
    }

    /// Packs a nucleotide sequence and appends it to `out`
    pub fn encode_sequence(&mut self, index: u64, seq: &[u8], out: &mut Vec<u8>) -> Result<()> {
        let base = self.options.base;
        base.encode(seq, &mut self.codes);
        pack(&self.codes, base.bits(), out).map_err(|e| overflow(index, Field::Sequence, e))
    }

    /// Packs a Phred+33 quality string and appends it to `out`
    pub fn encode_quality(&mut self, index: u64, qual: &[u8], out: &mut Vec<u8>) -> Result<()> {
        let quality = self.options.quality;
        if let Err(e) = quality.encode(qual, &mut self.codes) {
            return Err(WriteError::EncodingOverflow {
                index,
                field: Field::Quality,
                value: i32::from(e.score),
                bits: e.bits,
            }
            .into());
        }
        pack(&self.codes, quality.bits(), out).map_err(|e| overflow(index, Field::Quality, e))
    }

    /// Clear all buffers.
    pub fn clear(&mut self) {
        self.codes.clear();
        self.record.clear();
    }
}
