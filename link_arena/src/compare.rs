use core::cmp::Ordering;

use crate::Ptr;

/// A total order over elements, used by associative containers.
///
/// `compare` receives the handle and the element of both sides. It must be
/// antisymmetric (`compare(a, b) == compare(b, a).reverse()`) and transitive.
/// `Equal` means equal for ordering purposes, not identical contents.
///
/// Closures of the form `Fn(P, &T, P, &T) -> Ordering` are comparators:
///
/// ```
/// use core::cmp::Ordering;
///
/// use link_arena::{ptr_struct, Arena, ByOrd, Comparator, IdentityOrder};
///
/// ptr_struct!(P0);
///
/// let mut a: Arena<P0, i32> = Arena::new();
/// let p0 = a.insert(7);
/// let p1 = a.insert(-7);
///
/// assert_eq!(IdentityOrder.compare(p0, &a[p0], p1, &a[p1]), Ordering::Less);
/// assert_eq!(ByOrd.compare(p0, &a[p0], p1, &a[p1]), Ordering::Greater);
///
/// let by_abs = |_: P0, x: &i32, _: P0, y: &i32| x.abs().cmp(&y.abs());
/// assert_eq!(by_abs.compare(p0, &a[p0], p1, &a[p1]), Ordering::Equal);
/// ```
pub trait Comparator<P: Ptr, T> {
    fn compare(&self, p0: P, t0: &T, p1: P, t1: &T) -> Ordering;
}

impl<P: Ptr, T, F: Fn(P, &T, P, &T) -> Ordering> Comparator<P, T> for F {
    #[inline]
    fn compare(&self, p0: P, t0: &T, p1: P, t1: &T) -> Ordering {
        self(p0, t0, p1, t1)
    }
}

/// Orders two handles by identity: `Equal` for the same handle, otherwise
/// by slot index (and generation).
///
/// The order is consistent for the lifetime of the handles but carries no
/// meaning about the elements. It depends on the allocation history of the
/// arena, so it is not reproducible between runs that allocate differently
/// and it changes when an arena is compressed.
#[inline]
pub fn default_compare<P: Ptr>(p0: P, p1: P) -> Ordering {
    p0.cmp(&p1)
}

/// The comparator for elements without a domain ordering, see
/// [default_compare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IdentityOrder;

impl<P: Ptr, T> Comparator<P, T> for IdentityOrder {
    #[inline]
    fn compare(&self, p0: P, _: &T, p1: P, _: &T) -> Ordering {
        default_compare(p0, p1)
    }
}

/// Orders elements by their `Ord` impl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ByOrd;

impl<P: Ptr, T: Ord> Comparator<P, T> for ByOrd {
    #[inline]
    fn compare(&self, _: P, t0: &T, _: P, t1: &T) -> Ordering {
        t0.cmp(t1)
    }
}

/// Orders elements by a key extracted from each one
#[derive(Debug, Clone, Copy)]
pub struct ByKey<F>(pub F);

impl<P: Ptr, T, K: Ord, F: Fn(&T) -> K> Comparator<P, T> for ByKey<F> {
    #[inline]
    fn compare(&self, _: P, t0: &T, _: P, t1: &T) -> Ordering {
        (self.0)(t0).cmp(&(self.0)(t1))
    }
}
