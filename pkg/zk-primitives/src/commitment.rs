use std::fmt::{Debug, Display};
use std::str::FromStr;

use hex::FromHex;
use sha2::{Digest, Sha256};

use crate::{Element, Error, Result, COMMITMENT_WIDTH};

/// Width of each half of a 32-byte encoding or digest
pub const HALF_WIDTH: usize = COMMITMENT_WIDTH / 2;

/// The public identifier of a note: `SHA256(owner_encoding || amount_encoding)`
///
/// The relation consumes the digest as two field elements, [`Commitment::hash_hi`] and
/// [`Commitment::hash_lo`], the first and second 16 bytes respectively.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Commitment(#[cfg_attr(feature = "serde", serde(with = "hex::serde"))] pub [u8; 32]);

impl Commitment {
    /// Number of bytes in a commitment
    pub const SIZE: usize = 32;

    /// Rebuild a commitment from the two field elements the relation exposes
    ///
    /// Returns `None` if either element doesn't fit in 16 bytes
    #[must_use]
    pub fn from_halves(hash_hi: Element, hash_lo: Element) -> Option<Self> {
        let hi = hash_hi.to_be_half()?;
        let lo = hash_lo.to_be_half()?;

        let mut bytes = [0; 32];
        bytes[..HALF_WIDTH].copy_from_slice(&hi);
        bytes[HALF_WIDTH..].copy_from_slice(&lo);
        Some(Self(bytes))
    }

    /// The first 16 bytes of the digest
    #[must_use]
    pub fn hi(&self) -> [u8; 16] {
        half(&self.0[..HALF_WIDTH])
    }

    /// The last 16 bytes of the digest
    #[must_use]
    pub fn lo(&self) -> [u8; 16] {
        half(&self.0[HALF_WIDTH..])
    }

    /// The first half of the digest as a field element
    #[must_use]
    pub fn hash_hi(&self) -> Element {
        self.hi().into()
    }

    /// The second half of the digest as a field element
    #[must_use]
    pub fn hash_lo(&self) -> Element {
        self.lo().into()
    }

    /// The 64-character lowercase hex digest, without a `0x` prefix
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The digest bytes
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Display for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Debug for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Commitment {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Ok(Self(<[u8; 32]>::from_hex(s)?))
    }
}

/// The private half of a note: its two 32-byte encodings cut into four 16-byte halves
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpeningFields {
    /// First half of the owner encoding
    pub owner_hi: [u8; 16],
    /// Second half of the owner encoding
    pub owner_lo: [u8; 16],
    /// First half of the amount encoding
    pub amount_hi: [u8; 16],
    /// Second half of the amount encoding
    pub amount_lo: [u8; 16],
}

impl Debug for OpeningFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpeningFields")
            .field("owner_hi", &hex::encode(self.owner_hi))
            .field("owner_lo", &hex::encode(self.owner_lo))
            .field("amount_hi", &hex::encode(self.amount_hi))
            .field("amount_lo", &hex::encode(self.amount_lo))
            .finish()
    }
}

/// Hash a note's owner and amount encodings into its commitment
///
/// Both inputs must be exactly [`COMMITMENT_WIDTH`] bytes
///
/// ```rust
/// # use zk_primitives::*;
/// let owner = encode::<COMMITMENT_WIDTH, _>(&[0xab; 20]).unwrap();
/// let a = commit(owner.as_bytes(), encode::<COMMITMENT_WIDTH, _>(&1u64).unwrap().as_bytes()).unwrap();
/// let b = commit(owner.as_bytes(), encode::<COMMITMENT_WIDTH, _>(&2u64).unwrap().as_bytes()).unwrap();
///
/// assert_ne!(a, b);
/// assert!(commit(&[0; 20], &[0; 32]).is_err());
/// ```
pub fn commit(owner: &[u8], amount: &[u8]) -> Result<Commitment> {
    check_width(owner)?;
    check_width(amount)?;

    let digest = Sha256::new().chain_update(owner).chain_update(amount).finalize();
    Ok(Commitment(digest.into()))
}

/// Cut a note's owner and amount encodings into their 16-byte halves
pub fn split(owner: &[u8], amount: &[u8]) -> Result<OpeningFields> {
    check_width(owner)?;
    check_width(amount)?;

    Ok(OpeningFields {
        owner_hi: half(&owner[..HALF_WIDTH]),
        owner_lo: half(&owner[HALF_WIDTH..]),
        amount_hi: half(&amount[..HALF_WIDTH]),
        amount_lo: half(&amount[HALF_WIDTH..]),
    })
}

/// Recombine [`OpeningFields`] into the owner and amount encodings they were split from
#[must_use]
pub fn join(fields: &OpeningFields) -> ([u8; 32], [u8; 32]) {
    let mut owner = [0; 32];
    owner[..HALF_WIDTH].copy_from_slice(&fields.owner_hi);
    owner[HALF_WIDTH..].copy_from_slice(&fields.owner_lo);

    let mut amount = [0; 32];
    amount[..HALF_WIDTH].copy_from_slice(&fields.amount_hi);
    amount[HALF_WIDTH..].copy_from_slice(&fields.amount_lo);

    (owner, amount)
}

fn check_width(bytes: &[u8]) -> Result<()> {
    if bytes.len() == COMMITMENT_WIDTH {
        Ok(())
    } else {
        Err(Error::InvalidInputWidth {
            expected: COMMITMENT_WIDTH,
            actual: bytes.len(),
        })
    }
}

fn half(bytes: &[u8]) -> [u8; 16] {
    let mut out = [0; 16];
    out.copy_from_slice(bytes);
    out
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use test_strategy::proptest;

    use super::*;
    use crate::encode;

    fn owner_bytes(s: &str) -> [u8; 20] {
        <[u8; 20]>::from_hex(s).unwrap()
    }

    #[test]
    fn regression_digest() {
        let owner = encode::<COMMITMENT_WIDTH, _>(&owner_bytes(
            "4fdd54a50623a7c7b5b3055700eb4872356bd5b3",
        ))
        .unwrap();
        let amount = encode::<COMMITMENT_WIDTH, _>(&1u64).unwrap();

        let commitment = commit(owner.as_bytes(), amount.as_bytes()).unwrap();

        expect!["daaa228171d056a7964ac79b70bdd13c183ec48d2e3f1fc70e46332b779a9f48"]
            .assert_eq(&commitment.to_hex());
    }

    #[test]
    fn regression_digest_right_aligned_owner() {
        // owner bytes first, then zeroes: the layout some older clients hashed
        let mut owner = [0; 32];
        owner[..20].copy_from_slice(&owner_bytes("4fdd54a50623a7c7b5b3055700eb4872356bd5b3"));
        let amount = encode::<COMMITMENT_WIDTH, _>(&1u64).unwrap();

        let commitment = commit(&owner, amount.as_bytes()).unwrap();

        expect!["71d3492afc2c5436f5a61bc11eb5d1a852ad6b8c0ae1205588613c46cdb0beb7"]
            .assert_eq(&commitment.to_hex());
    }

    #[test]
    fn rejects_wrong_widths() {
        assert_eq!(
            commit(&[0; 31], &[0; 32]),
            Err(Error::InvalidInputWidth {
                expected: 32,
                actual: 31
            })
        );
        assert_eq!(
            split(&[0; 32], &[0; 12]),
            Err(Error::InvalidInputWidth {
                expected: 32,
                actual: 12
            })
        );
    }

    #[test]
    fn halves_match_hex_digest() {
        let commitment = commit(&[1; 32], &[2; 32]).unwrap();
        let hex = commitment.to_hex();

        assert_eq!(commitment.hash_hi(), hex[..32].parse::<Element>().unwrap());
        assert_eq!(commitment.hash_lo(), hex[32..].parse::<Element>().unwrap());
        assert_eq!(
            Commitment::from_halves(commitment.hash_hi(), commitment.hash_lo()),
            Some(commitment)
        );
        assert_eq!(hex.parse::<Commitment>().unwrap(), commitment);
        assert_eq!(format!("0x{hex}").parse::<Commitment>().unwrap(), commitment);
    }

    #[test]
    fn parse_rejects_bad_hex() {
        assert_eq!(
            "zz".repeat(32).parse::<Commitment>(),
            Err(Error::InvalidHex(hex::FromHexError::InvalidHexCharacter {
                c: 'z',
                index: 0
            }))
        );
        assert_eq!(
            "ab".parse::<Commitment>(),
            Err(Error::InvalidHex(hex::FromHexError::InvalidStringLength))
        );
    }

    #[proptest]
    fn split_then_join_is_identity(owner: [u8; 20], amount: u128) {
        let owner = encode::<COMMITMENT_WIDTH, _>(&owner).unwrap();
        let amount = encode::<COMMITMENT_WIDTH, _>(&amount).unwrap();

        let fields = split(owner.as_bytes(), amount.as_bytes()).unwrap();
        let (owner_again, amount_again) = join(&fields);

        assert_eq!(&owner_again, owner.as_bytes());
        assert_eq!(&amount_again, amount.as_bytes());
    }

    #[proptest]
    fn commit_is_deterministic(owner: [u8; 20], amount: u64, other_amount: u64) {
        let owner = encode::<COMMITMENT_WIDTH, _>(&owner).unwrap();
        let encoded = encode::<COMMITMENT_WIDTH, _>(&amount).unwrap();

        let a = commit(owner.as_bytes(), encoded.as_bytes()).unwrap();
        let b = commit(owner.as_bytes(), encoded.as_bytes()).unwrap();
        assert_eq!(a, b);

        if amount != other_amount {
            let other = encode::<COMMITMENT_WIDTH, _>(&other_amount).unwrap();
            assert_ne!(a, commit(owner.as_bytes(), other.as_bytes()).unwrap());
        }
    }
}
