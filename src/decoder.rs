//! Record decoding
//!
//! The inverse of the [`Encoder`](crate::Encoder). Decoding relies on the per-record length
//! prefix; streams written in the bare layout cannot be decoded.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{ReadError, Result};
use crate::options::{CompressOptions, RecordLayout};
use crate::pack::unpack;
use crate::record::Read;

/// Size of the per-record length prefix in bytes
pub const SIZE_PREFIX: usize = 4;

/// Decodes packed records back into reads
#[derive(Debug, Clone)]
pub struct Decoder {
    /// Options the records were encoded with
    options: CompressOptions,

    /// Reusable buffer for symbol codes
    codes: Vec<u8>,
}
impl Decoder {
    /// Creates a decoder for records written with `options`
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::UnframedStream`] for the bare layout.
    pub fn new(options: CompressOptions) -> Result<Self> {
        if options.layout == RecordLayout::Bare {
            return Err(ReadError::UnframedStream.into());
        }
        Ok(Self {
            options,
            codes: Vec::new(),
        })
    }

    #[must_use]
    pub fn options(&self) -> CompressOptions {
        self.options
    }

    /// Total size of the record whose length prefix is `prefix`
    ///
    /// # Panics
    ///
    /// Panics if `prefix` is shorter than [`SIZE_PREFIX`].
    #[must_use]
    pub fn record_size(&self, prefix: &[u8]) -> usize {
        let len = LittleEndian::read_u32(prefix) as usize;
        self.options.record_size(len)
    }

    /// Decodes the record at the start of `bytes` into `read`
    ///
    /// `index` is the 0-based position of the record, used for error context and as the
    /// identifier when the stream stores none.
    ///
    /// Returns the number of bytes consumed.
    pub fn decode(&mut self, index: u64, bytes: &[u8], read: &mut Read) -> Result<usize> {
        if bytes.len() < SIZE_PREFIX {
            return Err(ReadError::TruncatedRecord { index }.into());
        }
        let len = LittleEndian::read_u32(bytes) as usize;
        let total = self.options.record_size(len);
        if bytes.len() < total {
            return Err(ReadError::TruncatedRecord { index }.into());
        }
        read.clear();

        let mut pos = SIZE_PREFIX;
        if self.options.stores_ids() {
            let field = &bytes[pos..pos + self.options.id_capacity];
            let end = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
            read.id.extend_from_slice(&field[..end]);
            pos += self.options.id_capacity;
        } else {
            let mut ibuf = itoa::Buffer::new();
            read.id.extend_from_slice(ibuf.format(index).as_bytes());
        }

        let base = self.options.base;
        self.codes.clear();
        unpack(&bytes[pos..], base.bits(), len, &mut self.codes)?;
        base.decode(&self.codes, &mut read.seq);
        pos += crate::pack::packed_len(len, base.bits());

        let quality = self.options.quality;
        self.codes.clear();
        unpack(&bytes[pos..], quality.bits(), len, &mut self.codes)?;
        quality.decode(&self.codes, &mut read.qual);

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use crate::error::Error;
    use crate::record::RefRead;

    fn round_trip(options: CompressOptions, read: &RefRead) -> Result<Read> {
        let mut encoder = Encoder::new(options);
        let bytes = encoder.encode(0, read)?.to_vec();
        let mut decoder = Decoder::new(options)?;
        let mut decoded = Read::default();
        let consumed = decoder.decode(0, &bytes, &mut decoded)?;
        assert_eq!(consumed, bytes.len());
        Ok(decoded)
    }

    #[test]
    fn test_lossless_round_trip() -> Result<()> {
        let read = RefRead::new(b"SRR001 1/1", b"ACGTNNACGTTGCA", b"!#+5?IJ@@@```!");
        let options = CompressOptions::builder().id_capacity(16).build()?;
        let decoded = round_trip(options, &read)?;
        assert_eq!(decoded, read.to_owned_read());
        Ok(())
    }

    #[test]
    fn test_lossy_images() -> Result<()> {
        let options = CompressOptions::builder()
            .bits_per_base(2)
            .bits_per_qual(3)
            .id_capacity(4)
            .build()?;
        let read = RefRead::new(b"r1", b"ACGTNR", b"!#:@IK");
        let decoded = round_trip(options, &read)?;
        assert_eq!(decoded.id, b"r1");
        assert_eq!(decoded.seq, b"ACGTGG");
        assert_eq!(decoded.qual, b"!##@@J");
        Ok(())
    }

    #[test]
    fn test_index_as_id() -> Result<()> {
        let options = CompressOptions::builder().id_capacity(0).build()?;
        let mut encoder = Encoder::new(options);
        let bytes = encoder
            .encode(0, &RefRead::new(b"dropped", b"AC", b"II"))?
            .to_vec();
        let mut decoder = Decoder::new(options)?;
        let mut read = Read::default();
        decoder.decode(1234, &bytes, &mut read)?;
        assert_eq!(read.id, b"1234");
        assert_eq!(read.seq, b"AC");
        Ok(())
    }

    #[test]
    fn test_truncated() -> Result<()> {
        let options = CompressOptions::default();
        let mut encoder = Encoder::new(options);
        let bytes = encoder
            .encode(0, &RefRead::new(b"r", b"ACGTACGT", b"IIIIIIII"))?
            .to_vec();
        let mut decoder = Decoder::new(options)?;
        let mut read = Read::default();
        for cut in [0, 3, bytes.len() - 1] {
            let err = decoder.decode(2, &bytes[..cut], &mut read).unwrap_err();
            assert!(matches!(
                err,
                Error::ReadError(ReadError::TruncatedRecord { index: 2 })
            ));
        }
        Ok(())
    }

    #[test]
    fn test_bare_layout_rejected() -> Result<()> {
        let options = CompressOptions::builder()
            .layout(RecordLayout::Bare)
            .build()?;
        assert!(matches!(
            Decoder::new(options),
            Err(Error::ReadError(ReadError::UnframedStream))
        ));
        Ok(())
    }
}
