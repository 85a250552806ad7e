use std::fmt;
use std::str::FromStr;

use ethnum::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zk_primitives::Commitment;

use crate::{constants::OWNER_WIDTH, Error};

/// A 20-byte owner identifier (an ethereum style address)
///
/// Parsing accepts mixed case hex with or without a `0x` prefix, displaying always produces
/// lowercase hex with a `0x` prefix.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OwnerId(pub [u8; OWNER_WIDTH]);

/// A non-negative note value
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(pub U256);

/// The private data behind a note
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteOpening {
    /// Owner of the note
    pub owner: OwnerId,
    /// Value of the note
    pub amount: Amount,
}

/// A note's public commitment together with the opening that produces it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub commitment: Commitment,
    pub opening: NoteOpening,
}

/// A request to move `send_amount` out of the spender's note worth `spend_amount`
///
/// The remainder (the change) is returned to the spender in a new note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub spender: OwnerId,
    pub spend_amount: Amount,
    pub recipient: OwnerId,
    pub send_amount: Amount,
}

/// The record appended to the ledger's public note list when a note is created
///
/// This is the lowercase hex of `owner (20 bytes) || amount (12 bytes)`. Despite being stored
/// where a ciphertext would be, it is NOT encrypted: anyone reading the ledger can recover the
/// owner and amount of every note. Ownership scanning relies on exactly this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublishedNote(pub String);

impl OwnerId {
    /// The raw address bytes
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; OWNER_WIDTH] {
        &self.0
    }

    /// Lowercase hex without a `0x` prefix
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for OwnerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        let mut bytes = [0; OWNER_WIDTH];
        hex::decode_to_slice(stripped, &mut bytes).map_err(|_| Error::InvalidOwner(s.to_owned()))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; OWNER_WIDTH]> for OwnerId {
    fn from(bytes: [u8; OWNER_WIDTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId(0x{})", self.to_hex())
    }
}

impl Serialize for OwnerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OwnerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Amount {
    pub const ZERO: Self = Self(U256::ZERO);

    #[inline]
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(U256::from(value))
    }

    #[inline]
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    #[inline]
    #[must_use]
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    #[inline]
    #[must_use]
    pub fn to_u256(self) -> U256 {
        self.0
    }
}

macro_rules! amount_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Amount {
                #[inline]
                fn from(value: $t) -> Self {
                    Self(U256::from(value))
                }
            }
        )*
    };
}

amount_from_int!(u8, u16, u32, u64, u128);

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl FromStr for Amount {
    type Err = Error;

    /// Parse a decimal amount, or a hex amount prefixed with `0x`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.strip_prefix("0x") {
            Some(hex) => U256::from_str_radix(hex, 16),
            None => U256::from_str_radix(s, 10),
        };

        parsed
            .map(Self)
            .map_err(|_| Error::InvalidAmount(s.to_owned()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

// amounts are written as decimal strings so values above 2^53 survive JSON
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl TransferRequest {
    pub fn new(
        spender: OwnerId,
        spend_amount: impl Into<Amount>,
        recipient: OwnerId,
        send_amount: impl Into<Amount>,
    ) -> Self {
        Self {
            spender,
            spend_amount: spend_amount.into(),
            recipient,
            send_amount: send_amount.into(),
        }
    }

    /// The value returned to the spender
    pub fn change(&self) -> Result<Amount, Error> {
        self.spend_amount
            .checked_sub(self.send_amount)
            .ok_or(Error::NegativeChange {
                spend: self.spend_amount,
                send: self.send_amount,
            })
    }
}
