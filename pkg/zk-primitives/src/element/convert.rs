use crate::Element;
use core::num::TryFromIntError;
use ethnum::U256;
use std::str::FromStr;

macro_rules! from_int_impls {
    ($t:ty) => {
        impl From<$t> for Element {
            #[inline]
            fn from(value: $t) -> Self {
                Element(U256::from(value))
            }
        }

        impl TryFrom<Element> for $t {
            type Error = TryFromIntError;

            #[inline]
            fn try_from(value: Element) -> Result<Self, Self::Error> {
                <$t>::try_from(value.0)
            }
        }
    };
}

from_int_impls!(u8);
from_int_impls!(u16);
from_int_impls!(u32);
from_int_impls!(u64);
from_int_impls!(u128);

impl FromStr for Element {
    type Err = <U256 as FromStr>::Err;

    /// Parse a hex string, with or without a `0x` prefix
    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Ok(Self(U256::from_str_radix(s, 16)?))
    }
}

impl From<U256> for Element {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<Element> for U256 {
    fn from(value: Element) -> Self {
        value.0
    }
}

impl From<[u8; 16]> for Element {
    /// Interpret a 16-byte half of an encoding as a big-endian integer
    #[inline]
    fn from(half: [u8; 16]) -> Self {
        u128::from_be_bytes(half).into()
    }
}

impl Element {
    /// Parse a base-10 string, as produced by [`Element::to_decimal`]
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// let element = Element::from_decimal("1530452586").unwrap();
    /// assert_eq!(element, Element::new(0x5b38_da6a));
    /// ```
    pub fn from_decimal(s: &str) -> Result<Self, <U256 as FromStr>::Err> {
        Ok(Self(U256::from_str_radix(s, 10)?))
    }

    /// Convert the [`Element`] to its bytes in big-endian format
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// let element = Element::ZERO;
    /// assert_eq!(element.to_be_bytes(), [0; 32]);
    ///
    /// let element = Element::ONE;
    /// assert_eq!(element.to_be_bytes(), {
    ///     let mut temp = [0; 32];
    ///     temp[31] = 1;
    ///     temp
    /// });
    /// ```
    #[inline]
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    /// Convert big-endian bytes into an [`Element`]
    #[inline]
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(U256::from_be_bytes(bytes))
    }

    /// The low 16 bytes of this element, if the high 16 bytes are all zero
    ///
    /// This is the inverse of `From<[u8; 16]>`
    #[inline]
    #[must_use]
    pub fn to_be_half(self) -> Option<[u8; 16]> {
        u128::try_from(self.0).ok().map(u128::to_be_bytes)
    }
}
