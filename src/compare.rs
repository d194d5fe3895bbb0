// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pluggable ordering strategies for the ordered map backends.
//!
//! The red-black and B-tree maps are parameterized over a [`Comparator`],
//! a value supplied at map creation and inherited by every version derived
//! from that map. The default, [`NaturalOrder`], delegates to the key's
//! [`Ord`] instance, so most code never names a comparator at all.
//!
//! A comparator must be a total order over every type it is asked to
//! compare. Lookups by borrowed key forms (`&str` for `String` keys, say)
//! require the comparator to be implemented for the borrowed type as well;
//! `NaturalOrder` is implemented for anything `Ord`, which covers the
//! usual `Borrow` pairs for free.

use std::cmp::Ordering;

/// A total ordering strategy over keys of type `A`.
pub trait Comparator<A: ?Sized> {
    /// Compare two keys, returning their relative order.
    fn cmp(&self, left: &A, right: &A) -> Ordering;
}

/// The default comparator: the key type's own [`Ord`] instance.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct NaturalOrder;

impl<A: Ord + ?Sized> Comparator<A> for NaturalOrder {
    #[inline]
    fn cmp(&self, left: &A, right: &A) -> Ordering {
        left.cmp(right)
    }
}

/// A comparator which reverses another comparator.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Reversed<C>(pub C);

impl<A: ?Sized, C: Comparator<A>> Comparator<A> for Reversed<C> {
    #[inline]
    fn cmp(&self, left: &A, right: &A) -> Ordering {
        self.0.cmp(right, left)
    }
}

impl<A: ?Sized, F> Comparator<A> for F
where
    F: Fn(&A, &A) -> Ordering,
{
    #[inline]
    fn cmp(&self, left: &A, right: &A) -> Ordering {
        self(left, right)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn natural_order_matches_ord() {
        assert_eq!(Ordering::Less, NaturalOrder.cmp(&1, &2));
        assert_eq!(Ordering::Equal, NaturalOrder.cmp("a", "a"));
        assert_eq!(Ordering::Greater, NaturalOrder.cmp(&3_u8, &2_u8));
    }

    #[test]
    fn reversed_flips() {
        assert_eq!(Ordering::Greater, Reversed(NaturalOrder).cmp(&1, &2));
        assert_eq!(Ordering::Less, Reversed(NaturalOrder).cmp(&3, &2));
    }

    #[test]
    fn closures_are_comparators() {
        let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len());
        assert_eq!(Ordering::Less, by_len.cmp(&"ab", &"abc"));
    }
}
