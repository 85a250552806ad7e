use crate::Element;

/// Implement a binary operation
macro_rules! binop {
    ($trait:ident, $f:ident, $($t:tt)*) => {
        impl core::ops::$trait<Element> for Element {
            type Output = Element;

            #[inline]
            fn $f(self, rhs: Element) -> Self::Output {
                Element(self.0 $($t)* rhs.0)
            }
        }

        impl core::ops::$trait<u64> for Element {
            type Output = Element;

            #[inline]
            fn $f(self, rhs: u64) -> Self::Output {
                self $($t)* Element::from(rhs)
            }
        }

        impl core::ops::$trait<u128> for Element {
            type Output = Element;

            #[inline]
            fn $f(self, rhs: u128) -> Self::Output {
                self $($t)* Element::from(rhs)
            }
        }
    };
}

binop!(Add, add, +);
binop!(Sub, sub, -);

impl Element {
    /// Add two elements, returning `None` if the sum doesn't fit in 256 bits
    #[inline]
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Subtract `rhs` from `self`, returning `None` if the result would be negative
    #[inline]
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

impl core::iter::Sum<Element> for Element {
    fn sum<I: Iterator<Item = Element>>(iter: I) -> Self {
        iter.fold(Element::ZERO, |a, b| a + b)
    }
}
