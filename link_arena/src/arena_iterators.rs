//! Iterators for `Arena`

use core::{iter::Enumerate, marker::PhantomData, slice};

use recasting::{Recast, Recaster};

use crate::{arena::Entry::*, Advancer, Arena, Ptr};

/// An advancer over the valid `P`s of an `Arena`, in index order
pub struct PtrAdvancer<P: Ptr, T> {
    inx: usize,
    _boo: PhantomData<fn() -> (P, T)>,
}

impl<P: Ptr, T> Advancer for PtrAdvancer<P, T> {
    type Collection = Arena<P, T>;
    type Item = P;

    fn advance(&mut self, collection: &Self::Collection) -> Option<Self::Item> {
        while let Some(entry) = collection.m.get(self.inx) {
            let inx = self.inx;
            self.inx += 1;
            if let Allocated(gen, _) = entry {
                return Some(P::_from_raw(inx, *gen))
            }
        }
        None
    }
}

/// An iterator over the valid `P`s of an `Arena`
pub struct Ptrs<'a, P: Ptr, T> {
    arena: &'a Arena<P, T>,
    adv: PtrAdvancer<P, T>,
}

impl<'a, P: Ptr, T> Iterator for Ptrs<'a, P, T> {
    type Item = P;

    fn next(&mut self) -> Option<Self::Item> {
        self.adv.advance(self.arena)
    }
}

/// An iterator over `(P, &T)` in an `Arena`
pub struct Iter<'a, P: Ptr, T> {
    iter: Enumerate<slice::Iter<'a, crate::arena::Entry<P, T>>>,
}

impl<'a, P: Ptr, T> Iterator for Iter<'a, P, T> {
    type Item = (P, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        for (inx, entry) in self.iter.by_ref() {
            if let Allocated(gen, t) = entry {
                return Some((P::_from_raw(inx, *gen), t))
            }
        }
        None
    }
}

/// A mutable iterator over `(P, &mut T)` in an `Arena`
pub struct IterMut<'a, P: Ptr, T> {
    iter: Enumerate<slice::IterMut<'a, crate::arena::Entry<P, T>>>,
}

impl<'a, P: Ptr, T> Iterator for IterMut<'a, P, T> {
    type Item = (P, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        for (inx, entry) in self.iter.by_ref() {
            if let Allocated(gen, t) = entry {
                return Some((P::_from_raw(inx, *gen), t))
            }
        }
        None
    }
}

/// Iteration is in index order
impl<P: Ptr, T> Arena<P, T> {
    /// Advances over every valid `Ptr`. Every element valid before the loop
    /// began is witnessed as long as it stays valid during the loop, and the
    /// arena can be mutated freely between calls to `advance`.
    pub fn advancer(&self) -> PtrAdvancer<P, T> {
        PtrAdvancer {
            inx: 0,
            _boo: PhantomData,
        }
    }

    /// Iteration over all valid `P`
    pub fn ptrs(&self) -> Ptrs<P, T> {
        Ptrs {
            arena: self,
            adv: self.advancer(),
        }
    }

    /// Iteration over `&T`
    pub fn vals(&self) -> impl Iterator<Item = &T> {
        self.iter().map(|(_, t)| t)
    }

    /// Mutable iteration over `&mut T`
    pub fn vals_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.iter_mut().map(|(_, t)| t)
    }

    /// Iteration over `(P, &T)`
    pub fn iter(&self) -> Iter<P, T> {
        Iter {
            iter: self.m.iter().enumerate(),
        }
    }

    /// Mutable iteration over `(P, &mut T)`
    pub fn iter_mut(&mut self) -> IterMut<P, T> {
        IterMut {
            iter: self.m.iter_mut().enumerate(),
        }
    }
}

impl<'a, P: Ptr, T> IntoIterator for &'a Arena<P, T> {
    type IntoIter = Iter<'a, P, T>;
    type Item = (P, &'a T);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, P: Ptr, T> IntoIterator for &'a mut Arena<P, T> {
    type IntoIter = IterMut<'a, P, T>;
    type Item = (P, &'a mut T);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// The mapping returned by [Arena::compress_and_shrink_recaster]
impl<P: Ptr> Recaster for Arena<P, P> {
    type Item = P;

    fn recast_item(&self, item: &mut Self::Item) -> Result<(), Self::Item> {
        match self.get(*item) {
            Some(q) => {
                *item = *q;
                Ok(())
            }
            None => Err(*item),
        }
    }
}

impl<P: Ptr, I, T: Recast<I>> Recast<I> for Arena<P, T> {
    fn recast<R: Recaster<Item = I>>(&mut self, recaster: &R) -> Result<(), <R as Recaster>::Item> {
        for t in self.vals_mut() {
            t.recast(recaster)?;
        }
        Ok(())
    }
}
