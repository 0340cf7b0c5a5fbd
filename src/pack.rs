//! Fixed-width bit packing
//!
//! Items of `w` bits (`1 <= w <= 8`) are concatenated most-significant-bit first and the
//! resulting bit string is split into bytes, the first bit of each chunk becoming the most
//! significant bit of the byte. The final byte is padded with zero bits.
//!
//! Packed blobs carry no length or width information: unpacking needs both out of band and
//! drops the tail padding by truncating to the expected item count.

use crate::error::PackError;

/// Number of bytes needed to pack `count` items of `bits` bits each
#[inline]
#[must_use]
pub fn packed_len(count: usize, bits: u8) -> usize {
    (count * bits as usize).div_ceil(8)
}

fn check_width(bits: u8) -> Result<(), PackError> {
    if (1..=8).contains(&bits) {
        Ok(())
    } else {
        Err(PackError::UnsupportedWidth(bits))
    }
}

/// Packs `values` at `bits` bits per item and appends the bytes to `out`
///
/// Fails without touching `out` if the width is unsupported. On overflow `out` may hold a
/// partial blob; callers discard it.
///
/// ```
/// let mut out = Vec::new();
/// fastqube::pack::pack(&[10, 20, 30, 40], 6, &mut out).unwrap();
/// assert_eq!(out, vec![41, 71, 168]);
/// ```
pub fn pack(values: &[u8], bits: u8, out: &mut Vec<u8>) -> Result<(), PackError> {
    check_width(bits)?;
    out.reserve(packed_len(values.len(), bits));

    let width = u32::from(bits);
    let mut acc = 0u32;
    let mut pending = 0u32;
    for &value in values {
        if u32::from(value) >> width != 0 {
            return Err(PackError::Overflow { value, bits });
        }
        acc = (acc << width) | u32::from(value);
        pending += width;
        if pending >= 8 {
            pending -= 8;
            out.push((acc >> pending) as u8);
            acc &= (1 << pending) - 1;
        }
    }
    if pending > 0 {
        out.push((acc << (8 - pending)) as u8);
    }
    Ok(())
}

/// Unpacks `count` items of `bits` bits from `bytes` and appends them to `out`
///
/// Bytes past `packed_len(count, bits)` are ignored.
pub fn unpack(bytes: &[u8], bits: u8, count: usize, out: &mut Vec<u8>) -> Result<(), PackError> {
    check_width(bits)?;
    let expected = packed_len(count, bits);
    if bytes.len() < expected {
        return Err(PackError::Truncated {
            expected,
            got: bytes.len(),
        });
    }
    out.reserve(count);

    let width = u32::from(bits);
    let mask = (1u32 << width) - 1;
    let mut acc = 0u32;
    let mut available = 0u32;
    let mut next = 0;
    for _ in 0..count {
        while available < width {
            acc = (acc << 8) | u32::from(bytes[next]);
            next += 1;
            available += 8;
        }
        available -= width;
        out.push(((acc >> available) & mask) as u8);
        acc &= (1 << available) - 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(values: &[u8], bits: u8) -> Vec<u8> {
        let mut out = Vec::new();
        pack(values, bits, &mut out).unwrap();
        out
    }

    #[test]
    fn test_single_item_all_widths() {
        for bits in 1..=8u8 {
            for value in 0..(1u16 << bits) {
                let value = value as u8;
                let bytes = packed(&[value], bits);
                assert_eq!(bytes.len(), 1);
                let mut out = Vec::new();
                unpack(&bytes, bits, 1, &mut out).unwrap();
                assert_eq!(out, vec![value], "width {bits}");
            }
        }
    }

    #[test]
    fn test_packed_length() {
        for bits in 1..=8u8 {
            for count in 0..40usize {
                let values = vec![0u8; count];
                assert_eq!(packed(&values, bits).len(), (count * bits as usize).div_ceil(8));
            }
        }
    }

    #[test]
    fn test_known_vectors() {
        // A T C G -> 000 001 010 011
        assert_eq!(packed(&[0, 1, 2, 3], 3), vec![0x05, 0x30]);
        // A C T G -> 000 010 001 011
        assert_eq!(packed(&[0, 2, 1, 3], 3), vec![0x08, 0xB0]);
        assert_eq!(packed(&[10, 20, 30, 40], 6), vec![41, 71, 168]);
        assert_eq!(packed(&[1, 0, 1, 1, 0, 0, 0, 1, 1], 1), vec![0b1011_0001, 0b1000_0000]);
        assert_eq!(packed(&[0xAB, 0xCD], 8), vec![0xAB, 0xCD]);
        assert!(packed(&[], 3).is_empty());
    }

    #[test]
    fn test_padding_is_discarded() {
        let values = [4, 4, 4];
        let bytes = packed(&values, 3);
        assert_eq!(bytes.len(), 2);

        let mut out = Vec::new();
        unpack(&bytes, 3, 3, &mut out).unwrap();
        assert_eq!(out, values);

        // asking for more items than were packed reads the padding as zeros
        out.clear();
        unpack(&bytes, 3, 5, &mut out).unwrap();
        assert_eq!(out, vec![4, 4, 4, 0, 0]);
    }

    #[test]
    fn test_overflow() {
        let mut out = Vec::new();
        assert_eq!(
            pack(&[0, 8], 3, &mut out),
            Err(PackError::Overflow { value: 8, bits: 3 })
        );
        assert_eq!(
            pack(&[64], 6, &mut out),
            Err(PackError::Overflow { value: 64, bits: 6 })
        );
        assert!(pack(&[255], 8, &mut out).is_ok());
    }

    #[test]
    fn test_invalid_width() {
        let mut out = Vec::new();
        assert_eq!(pack(&[0], 0, &mut out), Err(PackError::UnsupportedWidth(0)));
        assert_eq!(pack(&[0], 9, &mut out), Err(PackError::UnsupportedWidth(9)));
        assert_eq!(
            unpack(&[0], 9, 1, &mut out),
            Err(PackError::UnsupportedWidth(9))
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_truncated() {
        let mut out = Vec::new();
        assert_eq!(
            unpack(&[0x05], 3, 4, &mut out),
            Err(PackError::Truncated {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_appends() {
        let mut out = vec![0xFF];
        pack(&[1, 1], 4, &mut out).unwrap();
        assert_eq!(out, vec![0xFF, 0x11]);

        let mut items = vec![9];
        unpack(&out[1..], 4, 2, &mut items).unwrap();
        assert_eq!(items, vec![9, 1, 1]);
    }
}
