//! Nucleotide encoding and decoding
//!
//! Bases are mapped to small integer codes before bit-packing. Two encodings exist:
//!
//! | Base       | 3-bit | 2-bit |
//! | ---------- | ----- | ----- |
//! | `A`        | 0     | 0     |
//! | `T`        | 1     | 1     |
//! | `C`        | 2     | 2     |
//! | `G`        | 3     | 3     |
//! | all others | 4     | 3     |
//!
//! The 3-bit encoding folds every non-`ACTG` symbol into a single "other" code which decodes
//! as `N`. The 2-bit encoding has no room for an "other" code and collapses those symbols
//! into `G`: it is **lossy** for any input that is not strictly `ACTG`.

use crate::error::{ConfigError, Field};

/// Code assigned to any non-`ACTG` symbol in 3-bit mode
pub const OTHER_CODE: u8 = 4;

/// Base emitted when decoding [`OTHER_CODE`]
pub const OTHER_BASE: u8 = b'N';

/// Bases in code order
const BASES: [u8; 5] = [b'A', b'T', b'C', b'G', OTHER_BASE];

/// Encodes a base using three bits
///
/// Returns [`OTHER_CODE`] for everything that is not `A`, `T`, `C` or `G`.
#[inline]
#[must_use]
pub fn three_bit(base: u8) -> u8 {
    match base {
        b'A' => 0,
        b'T' => 1,
        b'C' => 2,
        b'G' => 3,
        _ => OTHER_CODE,
    }
}

/// Encodes a base using two bits
///
/// Every non-`ACTG` symbol is squashed to `G`.
#[inline]
#[must_use]
pub fn two_bit(base: u8) -> u8 {
    match base {
        b'A' => 0,
        b'T' => 1,
        b'C' => 2,
        _ => 3,
    }
}

/// The encoding used for nucleotide sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseEncoding {
    /// 3 bits per base, `ACTG` preserved and everything else read back as `N`
    #[default]
    Lossless3Bit,
    /// 2 bits per base, everything that is not `ACTG` read back as `G`
    Lossy2Bit,
}
impl BaseEncoding {
    /// Resolves a raw bit width into an encoding
    pub fn from_bits(bits: u8) -> Result<Self, ConfigError> {
        match bits {
            3 => Ok(Self::Lossless3Bit),
            2 => Ok(Self::Lossy2Bit),
            _ => Err(ConfigError::UnsupportedBitWidth {
                field: Field::Sequence,
                bits,
            }),
        }
    }

    /// Number of bits used per base
    #[must_use]
    pub fn bits(self) -> u8 {
        match self {
            Self::Lossless3Bit => 3,
            Self::Lossy2Bit => 2,
        }
    }

    /// Whether every `{A, T, C, G, N}` sequence survives a round trip
    #[must_use]
    pub fn is_lossless(self) -> bool {
        matches!(self, Self::Lossless3Bit)
    }

    /// Encodes a single base
    #[inline]
    #[must_use]
    pub fn encode_base(self, base: u8) -> u8 {
        match self {
            Self::Lossless3Bit => three_bit(base),
            Self::Lossy2Bit => two_bit(base),
        }
    }

    /// Decodes a single code back into a base
    ///
    /// Codes above the encoding's range decode as `N`.
    #[inline]
    #[must_use]
    pub fn decode_base(self, code: u8) -> u8 {
        BASES.get(code as usize).copied().unwrap_or(OTHER_BASE)
    }

    /// Clears `codes` and fills it with the encoded sequence
    pub fn encode(self, sequence: &[u8], codes: &mut Vec<u8>) {
        codes.clear();
        codes.extend(sequence.iter().map(|&b| self.encode_base(b)));
    }

    /// Appends the decoded bases to `sequence`
    pub fn decode(self, codes: &[u8], sequence: &mut Vec<u8>) {
        sequence.extend(codes.iter().map(|&c| self.decode_base(c)));
    }
}
