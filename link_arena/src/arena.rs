use alloc::vec::Vec;
use core::{
    borrow::Borrow,
    fmt, mem,
    ops::{Index, IndexMut},
};

use Entry::*;

use crate::{Field, Ptr, PtrGen, RefError, RefPtr};

/// Internal entry of an `Arena`
#[derive(Clone)]
pub(crate) enum Entry<P: Ptr, T> {
    /// An unallocated slot pointing to the next free slot. The last free slot
    /// points to itself.
    Free(usize),
    /// A slot holding a `T` created at the given generation
    Allocated(P::Gen, T),
}

/// Generation checked slot storage that owns the elements which containers
/// link together.
///
/// Elements embed reference records ([SRef](crate::SRef),
/// [DRef](crate::DRef), [TRef](crate::TRef)) and containers store `P`
/// handles inside those records instead of addresses. Recovering the owner of
/// a reference is [Arena::cast], a checked lookup that fails on sentinels and
/// on handles to removed elements instead of reading freed memory.
///
/// ```
/// use link_arena::{ptr_struct, Arena, RefError, RefPtr};
///
/// ptr_struct!(P0);
///
/// let mut a: Arena<P0, String> = Arena::new();
/// let p_x = a.insert("x".to_owned());
/// let p_y = a.insert("y".to_owned());
/// assert_eq!(a.len(), 2);
///
/// assert_eq!(a.cast(RefPtr::Elem(p_x)).unwrap(), "x");
/// assert_eq!(a.cast(RefPtr::Head), Err(RefError::Sentinel));
///
/// // removal invalidates every handle to the removed element
/// assert_eq!(a.remove(p_x).unwrap(), "x");
/// assert_eq!(a.cast(RefPtr::Elem(p_x)), Err(RefError::Dangling));
/// assert_eq!(a[p_y], "y");
/// ```
pub struct Arena<P: Ptr, T> {
    /// # Invariants
    ///
    /// - `gen` starts at two so that `Ptr::invalid` never matches
    /// - all `Free` entries form one singly linked freelist starting at
    ///   `freelist_root` and ending at an entry pointing to itself
    /// - `freelist_root` is `None` if and only if there are no `Free` entries
    /// - every invalidation increments `gen`, and later allocations use the
    ///   new value
    pub(crate) m: Vec<Entry<P, T>>,
    pub(crate) len: usize,
    pub(crate) freelist_root: Option<usize>,
    pub(crate) gen: P::Gen,
}

impl<P: Ptr, T> Arena<P, T> {
    /// Used by tests
    #[doc(hidden)]
    pub fn _check_invariants(this: &Self) -> Result<(), &'static str> {
        if this.gen < P::Gen::two() {
            return Err("bad generation")
        }
        let n_allocated = this
            .m
            .iter()
            .filter(|entry| matches!(entry, Allocated(..)))
            .count();
        if this.len != n_allocated {
            return Err("len != n_allocated")
        }
        let mut freelist_len = 0;
        if let Some(root) = this.freelist_root {
            let mut inx = root;
            loop {
                match this.m.get(inx) {
                    Some(Free(next)) => {
                        freelist_len += 1;
                        if *next == inx {
                            break
                        }
                        inx = *next;
                    }
                    _ => return Err("bad freelist node"),
                }
                if freelist_len > this.m.len() {
                    return Err("endless freelist")
                }
            }
        }
        if freelist_len != (this.m.len() - n_allocated) {
            return Err("freelist discontinuous")
        }
        Ok(())
    }

    pub fn new() -> Self {
        Self {
            m: Vec::new(),
            len: 0,
            freelist_root: None,
            gen: P::Gen::two(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut res = Self::new();
        res.reserve(capacity);
        res
    }

    /// Returns the number of elements in the arena
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots, allocated or not
    pub fn capacity(&self) -> usize {
        self.m.len()
    }

    /// The generation counter, equal to two plus the number of invalidation
    /// operations performed on the arena (unless `P::Gen` is `()`)
    pub fn gen(&self) -> P::Gen {
        self.gen
    }

    pub(crate) fn inc_gen(&mut self) {
        self.gen = PtrGen::increment(self.gen);
    }

    /// Adds at least `additional` free slots to the arena
    pub fn reserve(&mut self, additional: usize) {
        if additional == 0 {
            return
        }
        let start = self.m.len();
        let end = start.checked_add(additional).expect("capacity overflow");
        self.m.reserve(additional);
        for i in (start + 1)..end {
            self.m.push(Free(i));
        }
        // the new run links into the old freelist or terminates itself
        self.m.push(Free(self.freelist_root.unwrap_or(end - 1)));
        self.freelist_root = Some(start);
    }

    /// Tries to insert `t` without allocating.
    ///
    /// # Errors
    ///
    /// Returns ownership of `t` if there are no free slots
    pub fn try_insert(&mut self, t: T) -> Result<P, T> {
        let Some(inx) = self.freelist_root else {
            return Err(t)
        };
        let gen = self.gen;
        let next = match mem::replace(&mut self.m[inx], Allocated(gen, t)) {
            Free(next) => next,
            Allocated(..) => unreachable!("freelist root was allocated"),
        };
        self.freelist_root = if next == inx { None } else { Some(next) };
        self.len += 1;
        Ok(P::_from_raw(inx, gen))
    }

    /// Inserts `t` into the arena and returns a `Ptr` to it. Allocates if the
    /// arena has no free slots.
    pub fn insert(&mut self, t: T) -> P {
        match self.try_insert(t) {
            Ok(p) => p,
            Err(t) => {
                self.reserve(self.m.len().max(1));
                match self.try_insert(t) {
                    Ok(p) => p,
                    Err(_) => unreachable!(),
                }
            }
        }
    }

    /// Inserts the `T` returned by `create`, which is given the same `Ptr`
    /// that is returned. This lets an element record its own handle.
    pub fn insert_with<F: FnOnce(P) -> T>(&mut self, create: F) -> P {
        if self.freelist_root.is_none() {
            self.reserve(self.m.len().max(1));
        }
        let inx = match self.freelist_root {
            Some(inx) => inx,
            None => unreachable!(),
        };
        let p = P::_from_raw(inx, self.gen);
        match self.try_insert(create(p)) {
            Ok(q) => q,
            Err(_) => unreachable!(),
        }
    }

    /// Returns if `p` is a valid `Ptr`
    pub fn contains(&self, p: P) -> bool {
        matches!(self.m.get(p.inx()), Some(Allocated(gen, _)) if *gen == p.gen())
    }

    /// Returns a reference to the `T` pointed to by `p`, or `None` if `p` is
    /// invalid
    #[must_use]
    pub fn get(&self, p: P) -> Option<&T> {
        match self.m.get(p.inx()) {
            Some(Allocated(gen, t)) if *gen == p.gen() => Some(t),
            _ => None,
        }
    }

    /// Returns a mutable reference to the `T` pointed to by `p`, or `None` if
    /// `p` is invalid
    #[must_use]
    pub fn get_mut(&mut self, p: P) -> Option<&mut T> {
        match self.m.get_mut(p.inx()) {
            Some(Allocated(gen, t)) if *gen == p.gen() => Some(t),
            _ => None,
        }
    }

    /// Gets two `&mut T` at once. Returns `None` if `p0 == p1` or if a `Ptr`
    /// is invalid.
    #[must_use]
    pub fn get2_mut(&mut self, p0: P, p1: P) -> Option<(&mut T, &mut T)> {
        if !(self.contains(p0) && self.contains(p1)) || (p0.inx() == p1.inx()) {
            return None
        }
        let (lo, hi) = (p0.inx().min(p1.inx()), p0.inx().max(p1.inx()));
        let (lhs, rhs) = self.m.split_at_mut(hi);
        match (&mut lhs[lo], &mut rhs[0]) {
            (Allocated(_, t_lo), Allocated(_, t_hi)) => {
                if p0.inx() < p1.inx() {
                    Some((t_lo, t_hi))
                } else {
                    Some((t_hi, t_lo))
                }
            }
            _ => unreachable!(),
        }
    }

    /// Recovers the element that owns the reference `r`.
    ///
    /// # Errors
    ///
    /// [RefError::Sentinel] if `r` is a head or tail sentinel, and
    /// [RefError::Dangling] if the element has been removed
    pub fn cast(&self, r: RefPtr<P>) -> Result<&T, RefError> {
        self.get(r.elem()?).ok_or(RefError::Dangling)
    }

    /// Mutable version of [Arena::cast]
    pub fn cast_mut(&mut self, r: RefPtr<P>) -> Result<&mut T, RefError> {
        self.get_mut(r.elem()?).ok_or(RefError::Dangling)
    }

    /// Returns the reference record that `F` projects out of the element at
    /// `p`
    pub fn field<F: Field<T>>(&self, p: P) -> Result<&F::Ref, RefError> {
        self.get(p).map(F::get).ok_or(RefError::Dangling)
    }

    /// Mutable version of [Arena::field]
    pub fn field_mut<F: Field<T>>(&mut self, p: P) -> Result<&mut F::Ref, RefError> {
        self.get_mut(p).map(F::get_mut).ok_or(RefError::Dangling)
    }

    /// Removes and returns the `T` pointed to by `p`, invalidating all
    /// handles to it. Returns `None` and does nothing if `p` is invalid.
    ///
    /// Any container the element is linked into must have unlinked it first,
    /// otherwise its neighbors are left with dangling links.
    #[must_use]
    pub fn remove(&mut self, p: P) -> Option<T> {
        if !self.contains(p) {
            return None
        }
        let inx = p.inx();
        let free = Free(self.freelist_root.unwrap_or(inx));
        let t = match mem::replace(&mut self.m[inx], free) {
            Allocated(_, t) => t,
            Free(_) => unreachable!(),
        };
        self.freelist_root = Some(inx);
        self.len -= 1;
        self.inc_gen();
        Some(t)
    }

    /// Drops all elements and invalidates all handles, keeping capacity
    pub fn clear(&mut self) {
        let n = self.m.len();
        for (i, entry) in self.m.iter_mut().enumerate() {
            *entry = Free(if i + 1 == n { i } else { i + 1 });
        }
        self.freelist_root = if n == 0 { None } else { Some(0) };
        self.len = 0;
        self.inc_gen();
    }

    /// Performs [Arena::clear] and releases the capacity
    pub fn clear_and_shrink(&mut self) {
        self.m = Vec::new();
        self.freelist_root = None;
        self.len = 0;
        self.inc_gen();
    }

    /// Moves all elements to the front so that capacity equals length. All
    /// handles are invalidated; `map` is called with each old handle, the
    /// element, and its new handle. Relative index order is preserved.
    ///
    /// Links embedded in the elements still use the old handles afterwards,
    /// see [Arena::compress_and_shrink_recaster] for fixing them.
    pub fn compress_and_shrink_with<F: FnMut(P, &mut T, P)>(&mut self, mut map: F) {
        self.inc_gen();
        let gen = self.gen;
        let old = mem::take(&mut self.m);
        let mut m = Vec::with_capacity(self.len);
        for (inx, entry) in old.into_iter().enumerate() {
            if let Allocated(old_gen, mut t) = entry {
                let q = P::_from_raw(m.len(), gen);
                map(P::_from_raw(inx, old_gen), &mut t, q);
                m.push(Allocated(gen, t));
            }
        }
        self.m = m;
        self.freelist_root = None;
    }

    /// Performs [Arena::compress_and_shrink_with] and returns the old to new
    /// handle mapping, which can be given to [Recast](crate::Recast)
    /// implementations of the elements and of containers.
    pub fn compress_and_shrink_recaster(&mut self) -> Arena<P, P> {
        let mut res: Arena<P, P> = Arena::new();
        res.gen = self.gen;
        let mut pairs = Vec::with_capacity(self.len);
        self.compress_and_shrink_with(|p, _, q| pairs.push((p, q)));
        // reproduce the old allocations, with free slots in the gaps
        let mut next = 0;
        for (p, q) in pairs {
            while next < p.inx() {
                res.m.push(Free(next));
                next += 1;
            }
            res.m.push(Allocated(p.gen(), q));
            next += 1;
        }
        res.len = res.m.iter().filter(|e| matches!(e, Allocated(..))).count();
        res.rebuild_freelist();
        res
    }

    /// Relinks all `Free` entries into a freelist, used after `m` has been
    /// built directly
    pub(crate) fn rebuild_freelist(&mut self) {
        let mut root = None;
        for (inx, entry) in self.m.iter_mut().enumerate().rev() {
            if let Free(next) = entry {
                *next = root.unwrap_or(inx);
                root = Some(inx);
            }
        }
        self.freelist_root = root;
    }
}

impl<P: Ptr, T> Default for Arena<P, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Ptr, T, B: Borrow<P>> Index<B> for Arena<P, T> {
    type Output = T;

    fn index(&self, p: B) -> &T {
        self.get(*p.borrow())
            .expect("indexed arena with invalidated `Ptr`")
    }
}

impl<P: Ptr, T, B: Borrow<P>> IndexMut<B> for Arena<P, T> {
    fn index_mut(&mut self, p: B) -> &mut T {
        self.get_mut(*p.borrow())
            .expect("indexed arena with invalidated `Ptr`")
    }
}

impl<P: Ptr, T: Clone> Clone for Arena<P, T> {
    /// `Ptr`s valid in `self` are valid in the clone and point to the
    /// corresponding clones
    fn clone(&self) -> Self {
        Self {
            m: self.m.clone(),
            len: self.len,
            freelist_root: self.freelist_root,
            gen: self.gen,
        }
    }
}

impl<P: Ptr, T: fmt::Debug> fmt::Debug for Arena<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<P: Ptr, T: PartialEq> PartialEq for Arena<P, T> {
    /// Compares all `(P, T)` pairs, ignoring capacity and `gen()`
    fn eq(&self, other: &Self) -> bool {
        (self.len == other.len) && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<P: Ptr, T: Eq> Eq for Arena<P, T> {}

impl<P: Ptr, T> FromIterator<T> for Arena<P, T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut a = Arena::new();
        for t in iter {
            a.insert(t);
        }
        a
    }
}
