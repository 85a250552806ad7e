use ethnum::U256;

use crate::{Element, Error, Result};

/// Width of the owner and amount encodings that are hashed into a commitment
pub const COMMITMENT_WIDTH: usize = 32;

/// Width of the amount encoding used by published note records
///
/// This encoding is never hashed, so it must not be mixed up with [`COMMITMENT_WIDTH`] encodings
pub const LEGACY_WIDTH: usize = 12;

/// A value that can be written as a big-endian unsigned integer
pub trait BeBytes {
    /// The big-endian bytes of this value, leading zeroes allowed
    fn be_bytes(&self) -> Vec<u8>;
}

macro_rules! be_bytes_int_impl {
    ($($t:ty),*) => {
        $(
            impl BeBytes for $t {
                #[inline]
                fn be_bytes(&self) -> Vec<u8> {
                    self.to_be_bytes().to_vec()
                }
            }
        )*
    };
}

be_bytes_int_impl!(u8, u16, u32, u64, u128, U256);

impl BeBytes for Element {
    #[inline]
    fn be_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

impl<const N: usize> BeBytes for [u8; N] {
    #[inline]
    fn be_bytes(&self) -> Vec<u8> {
        self.to_vec()
    }
}

impl BeBytes for [u8] {
    #[inline]
    fn be_bytes(&self) -> Vec<u8> {
        self.to_vec()
    }
}

/// A value encoded as exactly `W` big-endian bytes
///
/// Encodings of different widths are distinct types, so a 12-byte record encoding can't be passed
/// where a 32-byte commitment encoding is expected
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Encoded<const W: usize>([u8; W]);

impl<const W: usize> Encoded<W> {
    /// The encoded bytes
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; W] {
        &self.0
    }

    /// Consume the encoding, returning the bytes
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> [u8; W] {
        self.0
    }

    /// Lowercase hex of the encoded bytes, without a `0x` prefix
    #[inline]
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl<const W: usize> AsRef<[u8]> for Encoded<W> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const W: usize> core::fmt::Debug for Encoded<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Encoded<{W}>({})", self.to_hex())
    }
}

/// Encode `value` as exactly `W` big-endian bytes, zero-padded on the left
///
/// ```rust
/// # use zk_primitives::*;
/// let encoded = encode::<12, _>(&0xafu64).unwrap();
/// assert_eq!(encoded.to_hex(), "0000000000000000000000af");
///
/// let too_big = encode::<12, _>(&u128::MAX);
/// assert_eq!(too_big, Err(Error::EncodingOverflow { width: 12, required: 16 }));
/// ```
pub fn encode<const W: usize, T: BeBytes + ?Sized>(value: &T) -> Result<Encoded<W>> {
    let mut out = [0; W];
    encode_slice(&value.be_bytes(), &mut out)?;
    Ok(Encoded(out))
}

/// Encode `value` as exactly `width` big-endian bytes, for widths only known at runtime
pub fn encode_into<T: BeBytes + ?Sized>(value: &T, width: usize) -> Result<Vec<u8>> {
    let mut out = vec![0; width];
    encode_slice(&value.be_bytes(), &mut out)?;
    Ok(out)
}

fn encode_slice(bytes: &[u8], out: &mut [u8]) -> Result<()> {
    let first_significant = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let significant = &bytes[first_significant..];

    if significant.len() > out.len() {
        return Err(Error::EncodingOverflow {
            width: out.len(),
            required: significant.len(),
        });
    }

    let offset = out.len() - significant.len();
    out[..offset].fill(0);
    out[offset..].copy_from_slice(significant);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_on_the_left() {
        let encoded = encode::<COMMITMENT_WIDTH, _>(&5u64).unwrap();

        let mut expected = [0; 32];
        expected[31] = 5;
        assert_eq!(encoded.into_inner(), expected);
    }

    #[test]
    fn zero_is_all_zeroes() {
        assert_eq!(encode::<LEGACY_WIDTH, _>(&0u8).unwrap().into_inner(), [0; 12]);
        assert_eq!(encode_into(&0u128, 0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn identifier_keeps_all_bytes() {
        let owner: [u8; 20] = hex::decode("5b38da6a701c568545dcfcb03fcb875f56beddc4")
            .unwrap()
            .try_into()
            .unwrap();

        let encoded = encode::<COMMITMENT_WIDTH, _>(&owner).unwrap();

        assert_eq!(&encoded.as_bytes()[..12], &[0; 12]);
        assert_eq!(&encoded.as_bytes()[12..], &owner);
    }

    #[test]
    fn legacy_width_overflows() {
        // 2^96 needs 13 bytes
        let value = 1u128 << 96;

        assert_eq!(
            encode::<LEGACY_WIDTH, _>(&value),
            Err(Error::EncodingOverflow {
                width: 12,
                required: 13
            })
        );

        let fits = encode::<LEGACY_WIDTH, _>(&(value - 1)).unwrap();
        assert_eq!(fits.into_inner(), [0xff; 12]);
    }

    #[test]
    fn commitment_width_fits_any_u256() {
        let encoded = encode::<COMMITMENT_WIDTH, _>(&U256::MAX).unwrap();
        assert_eq!(encoded.into_inner(), [0xff; 32]);
    }

    #[test]
    fn runtime_width_matches_const_width() {
        let value = 0x0102_0304u32;

        assert_eq!(
            encode_into(&value, 12).unwrap(),
            encode::<12, _>(&value).unwrap().as_bytes().to_vec()
        );
        assert_eq!(
            encode_into(&value, 3),
            Err(Error::EncodingOverflow {
                width: 3,
                required: 4
            })
        );
    }
}
