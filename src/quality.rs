//! Quality score decoding and quantization
//!
//! Quality characters follow the Phred+33 convention: the score of a character is its ASCII
//! code minus 33. Scores are either stored as-is in six bits, or reduced to one of five
//! coarse blocks stored in three bits.
//!
//! | Block | Scores       | Decodes to |
//! | ----- | ------------ | ---------- |
//! | 0     | `< 2`        | 0          |
//! | 1     | `2 ..< 26`   | 2          |
//! | 2     | `26 ..< 31`  | 26         |
//! | 3     | `31 ..< 41`  | 31         |
//! | 4     | `>= 41`      | 41         |

use crate::error::{ConfigError, Field};

/// ASCII offset of Phred+33 quality characters
pub const PHRED_OFFSET: u8 = 33;

/// Largest score representable in raw mode
pub const MAX_RAW_SCORE: i16 = 63;

/// Lower bound of each block, used as the block's decoded score
const BLOCK_FLOORS: [i16; 5] = [0, 2, 26, 31, 41];

/// Converts a Phred+33 quality character to its score
///
/// Characters below `!` yield negative scores; they are not rejected here.
#[inline]
#[must_use]
pub fn phred_score(qual: u8) -> i16 {
    i16::from(qual) - i16::from(PHRED_OFFSET)
}

/// Converts a score back to its Phred+33 character
#[inline]
#[must_use]
pub fn phred_char(score: i16) -> u8 {
    (score + i16::from(PHRED_OFFSET)) as u8
}

/// Maps a score to its quantization block
#[inline]
#[must_use]
pub fn block_qual(score: i16) -> u8 {
    match score {
        s if s < 2 => 0,
        s if s < 26 => 1,
        s if s < 31 => 2,
        s if s < 41 => 3,
        _ => 4,
    }
}

/// Representative score of a block: the lower bound of its interval
///
/// Codes past the last block saturate to the last block.
#[inline]
#[must_use]
pub fn block_score(block: u8) -> i16 {
    BLOCK_FLOORS[(block as usize).min(BLOCK_FLOORS.len() - 1)]
}

/// A quality score that cannot be represented in raw mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOverflow {
    pub score: i16,
    pub bits: u8,
}

/// The encoding used for quality strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityEncoding {
    /// 6 bits per score, scores `0..=63` stored exactly
    #[default]
    Raw,
    /// 3 bits per score, scores reduced to five blocks
    BlockQuantized,
}
impl QualityEncoding {
    /// Resolves a raw bit width into an encoding
    pub fn from_bits(bits: u8) -> Result<Self, ConfigError> {
        match bits {
            6 => Ok(Self::Raw),
            3 => Ok(Self::BlockQuantized),
            _ => Err(ConfigError::UnsupportedBitWidth {
                field: Field::Quality,
                bits,
            }),
        }
    }

    #[must_use]
    pub fn bits(self) -> u8 {
        match self {
            Self::Raw => 6,
            Self::BlockQuantized => 3,
        }
    }

    #[must_use]
    pub fn is_lossless(self) -> bool {
        matches!(self, Self::Raw)
    }

    /// Clears `codes` and fills it with one code per quality character
    ///
    /// In raw mode, scores outside `0..=63` are reported rather than wrapped.
    pub fn encode(self, quality: &[u8], codes: &mut Vec<u8>) -> Result<(), ScoreOverflow> {
        codes.clear();
        codes.reserve(quality.len());
        match self {
            Self::Raw => {
                for &q in quality {
                    let score = phred_score(q);
                    if !(0..=MAX_RAW_SCORE).contains(&score) {
                        return Err(ScoreOverflow {
                            score,
                            bits: self.bits(),
                        });
                    }
                    codes.push(score as u8);
                }
            }
            Self::BlockQuantized => {
                codes.extend(quality.iter().map(|&q| block_qual(phred_score(q))));
            }
        }
        Ok(())
    }

    /// Appends the Phred+33 characters for `codes` to `quality`
    pub fn decode(self, codes: &[u8], quality: &mut Vec<u8>) {
        match self {
            Self::Raw => quality.extend(codes.iter().map(|&c| phred_char(i16::from(c)))),
            Self::BlockQuantized => {
                quality.extend(codes.iter().map(|&c| phred_char(block_score(c))));
            }
        }
    }
}
