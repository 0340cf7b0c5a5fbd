//! Compression options
//!
//! [`CompressOptions`] is built once, validated, and then handed by value to every component
//! that needs it. It is `Copy` and holds no interior state.

use crate::error::Result;
use crate::nuc::BaseEncoding;
use crate::quality::QualityEncoding;

/// Default identifier field capacity in bytes
pub const DEFAULT_ID_CAPACITY: usize = 64;

/// Framing of individual records in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordLayout {
    /// Each record starts with its sequence length as a little-endian `u32`
    #[default]
    LengthPrefixed,
    /// Records are written back to back with no length information
    ///
    /// Streams in this layout cannot be split into records again and are write-only.
    Bare,
}
impl RecordLayout {
    /// Name used in the stream header
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LengthPrefixed => "length-prefixed",
            Self::Bare => "bare",
        }
    }

    /// Parses the name used in the stream header
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "length-prefixed" => Some(Self::LengthPrefixed),
            "bare" => Some(Self::Bare),
            _ => None,
        }
    }

    /// Number of bytes preceding the identifier field of each record
    #[must_use]
    pub fn prefix_len(self) -> usize {
        match self {
            Self::LengthPrefixed => 4,
            Self::Bare => 0,
        }
    }
}

/// Immutable configuration for one compression run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// Encoding of nucleotide sequences
    pub base: BaseEncoding,

    /// Encoding of quality strings
    pub quality: QualityEncoding,

    /// Width of the identifier field in bytes, `0` omits identifiers
    pub id_capacity: usize,

    /// Framing of records
    pub layout: RecordLayout,
}
impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            base: BaseEncoding::default(),
            quality: QualityEncoding::default(),
            id_capacity: DEFAULT_ID_CAPACITY,
            layout: RecordLayout::default(),
        }
    }
}
impl CompressOptions {
    #[must_use]
    pub fn builder() -> CompressOptionsBuilder {
        CompressOptionsBuilder::default()
    }

    #[must_use]
    pub fn bits_per_base(&self) -> u8 {
        self.base.bits()
    }

    #[must_use]
    pub fn bits_per_qual(&self) -> u8 {
        self.quality.bits()
    }

    /// Whether records written with these options can be decoded back exactly
    ///
    /// This holds for sequences over `{A, T, C, G, N}` and Phred+33 scores in `0..=63`.
    #[must_use]
    pub fn is_lossless(&self) -> bool {
        self.base.is_lossless()
            && self.quality.is_lossless()
            && self.layout == RecordLayout::LengthPrefixed
    }

    /// Whether identifiers are stored
    #[must_use]
    pub fn stores_ids(&self) -> bool {
        self.id_capacity > 0
    }

    /// Size in bytes of a packed record holding `len` bases
    #[must_use]
    pub fn record_size(&self, len: usize) -> usize {
        self.layout.prefix_len()
            + self.id_capacity
            + crate::pack::packed_len(len, self.bits_per_base())
            + crate::pack::packed_len(len, self.bits_per_qual())
    }
}

/// Builder for [`CompressOptions`] taking raw bit widths
///
/// # Examples
///
/// ```
/// # use fastqube::{CompressOptions, Result};
/// # fn main() -> Result<()> {
/// let options = CompressOptions::builder()
///     .bits_per_base(2)
///     .bits_per_qual(3)
///     .id_capacity(32)
///     .build()?;
/// assert!(!options.is_lossless());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CompressOptionsBuilder {
    bits_per_base: Option<u8>,
    bits_per_qual: Option<u8>,
    id_capacity: Option<usize>,
    layout: Option<RecordLayout>,
}
impl CompressOptionsBuilder {
    #[must_use]
    pub fn bits_per_base(mut self, bits: u8) -> Self {
        self.bits_per_base = Some(bits);
        self
    }
    #[must_use]
    pub fn bits_per_qual(mut self, bits: u8) -> Self {
        self.bits_per_qual = Some(bits);
        self
    }
    #[must_use]
    pub fn id_capacity(mut self, capacity: usize) -> Self {
        self.id_capacity = Some(capacity);
        self
    }
    #[must_use]
    pub fn layout(mut self, layout: RecordLayout) -> Self {
        self.layout = Some(layout);
        self
    }
    pub fn build(self) -> Result<CompressOptions> {
        let base = match self.bits_per_base {
            Some(bits) => BaseEncoding::from_bits(bits)?,
            None => BaseEncoding::default(),
        };
        let quality = match self.bits_per_qual {
            Some(bits) => QualityEncoding::from_bits(bits)?,
            None => QualityEncoding::default(),
        };
        Ok(CompressOptions {
            base,
            quality,
            id_capacity: self.id_capacity.unwrap_or(DEFAULT_ID_CAPACITY),
            layout: self.layout.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, Error, Field};

    #[test]
    fn test_defaults() -> Result<()> {
        let options = CompressOptions::builder().build()?;
        assert_eq!(options, CompressOptions::default());
        assert_eq!(options.bits_per_base(), 3);
        assert_eq!(options.bits_per_qual(), 6);
        assert_eq!(options.id_capacity, 64);
        assert!(options.is_lossless());
        Ok(())
    }

    #[test]
    fn test_unsupported_widths() {
        let err = CompressOptions::builder().bits_per_base(4).build().unwrap_err();
        assert!(matches!(
            err,
            Error::ConfigError(ConfigError::UnsupportedBitWidth {
                field: Field::Sequence,
                bits: 4
            })
        ));

        let err = CompressOptions::builder().bits_per_qual(8).build().unwrap_err();
        assert!(matches!(
            err,
            Error::ConfigError(ConfigError::UnsupportedBitWidth {
                field: Field::Quality,
                bits: 8
            })
        ));
    }

    #[test]
    fn test_lossless_combinations() -> Result<()> {
        let lossy_base = CompressOptions::builder().bits_per_base(2).build()?;
        assert!(!lossy_base.is_lossless());

        let lossy_qual = CompressOptions::builder().bits_per_qual(3).build()?;
        assert!(!lossy_qual.is_lossless());

        let bare = CompressOptions::builder().layout(RecordLayout::Bare).build()?;
        assert!(!bare.is_lossless());
        Ok(())
    }

    #[test]
    fn test_record_size() -> Result<()> {
        let options = CompressOptions::builder().id_capacity(8).build()?;
        // 4 prefix + 8 id + ceil(12/8) + ceil(24/8)
        assert_eq!(options.record_size(4), 4 + 8 + 2 + 3);

        let options = CompressOptions::builder()
            .id_capacity(0)
            .layout(RecordLayout::Bare)
            .build()?;
        assert_eq!(options.record_size(0), 0);
        Ok(())
    }
}
