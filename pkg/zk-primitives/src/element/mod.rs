use ethnum::U256;

mod arith;
mod convert;
mod fmt;

#[cfg(feature = "serde")]
mod serde;

/// A 256-bit unsigned integer, used as a single input to the transfer relation
///
/// The relation only ever places 128-bit values in an element (one half of a 32-byte encoding or
/// digest), so every element built by this crate is far below the proving backend's field
/// modulus and never wraps.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Element(#[cfg_attr(feature = "serde", serde(with = "serde"))] pub(crate) U256);

impl Element {
    /// The zero element of the group (the additive identity)
    pub const ZERO: Self = Self(U256::ZERO);

    /// The one element of the group (the multiplicative identity)
    pub const ONE: Self = Self(U256::ONE);

    /// Create a new [`Element`] from a u64
    ///
    /// This is largely provided to help type inference in simple cases
    #[inline]
    #[must_use]
    pub fn new(i: u64) -> Self {
        Self(U256::from(i))
    }

    /// Convert this [`Element`] to a U256
    #[inline]
    #[must_use]
    pub fn to_u256(self) -> U256 {
        self.0
    }

    /// Convert this [`Element`] to a hex string
    #[inline]
    #[must_use]
    pub fn to_hex(self) -> String {
        hex::encode(self.to_be_bytes())
    }

    /// Convert this [`Element`] to a base-10 string, the form the proving backend consumes
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// assert_eq!(Element::new(255).to_decimal(), "255");
    /// assert_eq!(Element::ZERO.to_decimal(), "0");
    /// ```
    #[inline]
    #[must_use]
    pub fn to_decimal(self) -> String {
        self.0.to_string()
    }

    /// If this element is zero, returns true
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

macro_rules! partial_eq_impl {
    ($int:ty) => {
        impl PartialEq<$int> for Element {
            fn eq(&self, other: &$int) -> bool {
                *self == Element::from(*other)
            }
        }
    };
}

partial_eq_impl!(u8);
partial_eq_impl!(u16);
partial_eq_impl!(u32);
partial_eq_impl!(u64);
partial_eq_impl!(u128);

#[cfg(any(test, feature = "proptest"))]
pub mod proptest {
    use super::Element;
    use ::proptest::{arbitrary::StrategyFor, prelude::*, strategy::Map};
    use ethnum::U256;

    impl Arbitrary for Element {
        type Strategy = Map<StrategyFor<[u8; 32]>, fn([u8; 32]) -> Self>;
        type Parameters = ();

        fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
            any::<[u8; 32]>().prop_map(|array| Self(U256::from_be_bytes(array)))
        }
    }
}

#[cfg(test)]
mod test {
    use super::Element;

    #[test]
    fn syntax_test() {
        let element = Element::new(123);

        assert_eq!(element + 1u64, Element::new(124));
        assert_eq!(element - 2u64, Element::new(121));
        assert_eq!(element + Element::ONE, Element::new(124));
        assert_eq!(element - Element::new(2), Element::new(121));

        assert_eq!(Element::new(1).to_string(), "1");
        assert_eq!(Element::new(100).to_string(), "64");
        assert_eq!(Element::new(123).to_string(), "7b");
        assert_eq!(Element::new(123).to_decimal(), "123");

        assert_eq!(
            (1..=10).map(Element::new).sum::<Element>(),
            Element::new(55)
        );
    }

    #[test]
    fn checked_arith() {
        assert_eq!(Element::new(1).checked_sub(Element::new(2)), None);
        assert_eq!(Element::new(5).checked_sub(Element::new(1)), Some(Element::new(4)));
        assert_eq!(
            Element::from(u128::MAX).checked_add(Element::ONE),
            Some(Element::from(u128::MAX) + 1u64)
        );
    }
}
