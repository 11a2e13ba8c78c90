//! Search predicates.
//!
//! Sequential and associative containers examine elements differently, so
//! there are two predicate traits instead of one callback whose return value
//! means different things depending on the container. Both are only ever
//! called with elements reached through a successful
//! [cast](crate::Arena::cast), never with a head or tail sentinel, and both
//! only get shared access so they cannot disturb the topology being searched.

use core::cmp::Ordering;

use crate::Ptr;

/// Boolean predicate used to stop linear scans of
/// [SChain](crate::SChain) and [DChain](crate::DChain).
///
/// Closures of the form `Fn(P, &T) -> bool` are matchers.
pub trait Matcher<P: Ptr, T> {
    fn matches(&self, p: P, t: &T) -> bool;
}

impl<P: Ptr, T, F: Fn(P, &T) -> bool> Matcher<P, T> for F {
    #[inline]
    fn matches(&self, p: P, t: &T) -> bool {
        self(p, t)
    }
}

/// Three way predicate used to guide descent in a [TTree](crate::TTree).
///
/// Returns the ordering of the examined element relative to the target that
/// the predicate encodes: `Less` if the element is smaller than the target
/// (continue to the right), `Greater` if it is greater (continue to the left),
/// and `Equal` if it is the target.
///
/// Closures of the form `Fn(P, &T) -> Ordering` are order predicates.
pub trait Order<P: Ptr, T> {
    fn order(&self, p: P, t: &T) -> Ordering;
}

impl<P: Ptr, T, F: Fn(P, &T) -> Ordering> Order<P, T> for F {
    #[inline]
    fn order(&self, p: P, t: &T) -> Ordering {
        self(p, t)
    }
}

/// Matches the element with a given handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IsPtr<P: Ptr>(pub P);

impl<P: Ptr, T> Matcher<P, T> for IsPtr<P> {
    #[inline]
    fn matches(&self, p: P, _: &T) -> bool {
        p == self.0
    }
}

/// Matches elements equal to a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Equals<'a, T>(pub &'a T);

impl<'a, P: Ptr, T: PartialEq> Matcher<P, T> for Equals<'a, T> {
    #[inline]
    fn matches(&self, _: P, t: &T) -> bool {
        t == self.0
    }
}

/// Orders elements against a target value with `Ord`, the order predicate
/// counterpart of [ByOrd](crate::ByOrd)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target<'a, T>(pub &'a T);

impl<'a, P: Ptr, T: Ord> Order<P, T> for Target<'a, T> {
    #[inline]
    fn order(&self, _: P, t: &T) -> Ordering {
        t.cmp(self.0)
    }
}
