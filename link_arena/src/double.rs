use core::{fmt, marker::PhantomData};

use recasting::{Recast, Recaster};

use crate::{Arena, DRef, Dir, Field, Matcher, Ptr, RefError, RefPtr, NEXT, PREV};

/// A doubly linked chain of elements bounded by head and tail sentinels.
///
/// Walking in [Dir::Next] goes from the head toward the tail, [Dir::Prev]
/// goes back. `head[Next]` is the first element (or the tail when empty) and
/// `tail[Prev]` is the last element (or the head), while `head[Prev]` and
/// `tail[Next]` are never set. Because of the sentinels, linking and
/// unlinking never special cases the ends of the chain.
///
/// ```
/// use link_arena::{ptr_struct, ref_field, Arena, DChain, DRef, Dir, RefPtr};
///
/// ptr_struct!(P0);
///
/// struct Node {
///     name: char,
///     link: DRef<P0>,
/// }
///
/// ref_field!(Link => Node { link: DRef<P0> });
///
/// let mut a: Arena<P0, Node> = Arena::new();
/// let mut chain: DChain<P0, Link> = DChain::new();
/// let add = |a: &mut Arena<P0, Node>, name| a.insert(Node { name, link: DRef::new() });
/// let p_a = add(&mut a, 'A');
/// let p_b = add(&mut a, 'B');
/// let p_c = add(&mut a, 'C');
/// chain.push_back(&mut a, p_a).unwrap();
/// chain.push_back(&mut a, p_c).unwrap();
/// // link `B` on the `Next` side of `A`
/// chain.link(&mut a, RefPtr::Elem(p_a), Dir::Next, p_b).unwrap();
///
/// let names = |chain: &DChain<P0, Link>, a: &Arena<P0, Node>, dir| {
///     chain.iter(a, dir).map(|(_, node)| node.name).collect::<String>()
/// };
/// assert_eq!(names(&chain, &a, Dir::Next), "ABC");
/// assert_eq!(names(&chain, &a, Dir::Prev), "CBA");
///
/// chain.unlink(&mut a, p_b).unwrap();
/// assert_eq!(a[p_a].link.next(), Some(RefPtr::Elem(p_c)));
/// assert_eq!(a[p_c].link.prev(), Some(RefPtr::Elem(p_a)));
/// assert_eq!(a[p_a].link.prev(), Some(RefPtr::Head));
/// ```
pub struct DChain<P: Ptr, F> {
    head: DRef<P>,
    tail: DRef<P>,
    _boo: PhantomData<fn() -> F>,
}

impl<P: Ptr, F> DChain<P, F> {
    /// Creates an empty chain with the head and tail linked to each other
    pub fn new() -> Self {
        let mut head = DRef::new();
        let mut tail = DRef::new();
        head.r[NEXT] = Some(RefPtr::Tail);
        tail.r[PREV] = Some(RefPtr::Head);
        Self {
            head,
            tail,
            _boo: PhantomData,
        }
    }

    #[cfg(feature = "serde_support")]
    pub(crate) fn from_sentinels(head: DRef<P>, tail: DRef<P>) -> Self {
        Self {
            head,
            tail,
            _boo: PhantomData,
        }
    }

    pub fn head(&self) -> &DRef<P> {
        &self.head
    }

    pub fn tail(&self) -> &DRef<P> {
        &self.tail
    }

    pub fn is_empty(&self) -> bool {
        self.head.r[NEXT] == Some(RefPtr::Tail)
    }

    pub fn first(&self) -> Option<P> {
        self.head.r[NEXT].and_then(RefPtr::as_elem)
    }

    pub fn last(&self) -> Option<P> {
        self.tail.r[PREV].and_then(RefPtr::as_elem)
    }

    /// The sentinel at the end of a walk in direction `dir`
    fn end(dir: Dir) -> RefPtr<P> {
        match dir {
            Dir::Next => RefPtr::Tail,
            Dir::Prev => RefPtr::Head,
        }
    }
}

impl<P: Ptr, F> DChain<P, F> {
    /// Used by tests
    #[doc(hidden)]
    pub fn _check_invariants<T>(this: &Self, a: &Arena<P, T>) -> Result<(), &'static str>
    where
        F: Field<T, Ref = DRef<P>>,
    {
        if this.head.r[PREV].is_some() || this.tail.r[NEXT].is_some() {
            return Err("sentinel has an outer link")
        }
        let mut prev = RefPtr::Head;
        let mut r = this.head.r[NEXT];
        for _ in 0..=a.len() {
            match r {
                Some(RefPtr::Tail) => {
                    if this.tail.r[PREV] != Some(prev) {
                        return Err("tail does not link back to the last element")
                    }
                    return Ok(())
                }
                Some(RefPtr::Elem(p)) => {
                    let Ok(dref) = a.field::<F>(p) else {
                        return Err("dangling link")
                    };
                    if dref.r[PREV] != Some(prev) {
                        return Err("`a[Next] == b` but `b[Prev] != a`")
                    }
                    prev = RefPtr::Elem(p);
                    r = dref.r[NEXT];
                }
                Some(RefPtr::Head) => return Err("link to head sentinel"),
                None => return Err("chain is broken"),
            }
        }
        Err("chain does not reach the tail")
    }

    fn record<'a, T>(&'a self, a: &'a Arena<P, T>, r: RefPtr<P>) -> Result<&'a DRef<P>, RefError>
    where
        F: Field<T, Ref = DRef<P>>,
    {
        match r {
            RefPtr::Head => Ok(&self.head),
            RefPtr::Tail => Ok(&self.tail),
            RefPtr::Elem(p) => a.field::<F>(p),
        }
    }

    fn record_mut<'a, T>(
        &'a mut self,
        a: &'a mut Arena<P, T>,
        r: RefPtr<P>,
    ) -> Result<&'a mut DRef<P>, RefError>
    where
        F: Field<T, Ref = DRef<P>>,
    {
        match r {
            RefPtr::Head => Ok(&mut self.head),
            RefPtr::Tail => Ok(&mut self.tail),
            RefPtr::Elem(p) => a.field_mut::<F>(p),
        }
    }

    /// Returns the neighbor of `at` in direction `dir`.
    ///
    /// # Errors
    ///
    /// `Boundary` when stepping outward from a sentinel, `NotLinked` if `at`
    /// is an unlinked element, `Dangling` if `at` is not in the arena
    pub fn step<T>(&self, a: &Arena<P, T>, at: RefPtr<P>, dir: Dir) -> Result<RefPtr<P>, RefError>
    where
        F: Field<T, Ref = DRef<P>>,
    {
        if at == Self::end(dir) {
            return Err(RefError::Boundary)
        }
        self.record(a, at)?.r[dir.inx()].ok_or(RefError::NotLinked)
    }

    /// Links the unlinked element `p` on the `dir` side of `at`, between `at`
    /// and its current neighbor in that direction. `at` can be a sentinel as
    /// long as `dir` points into the chain.
    ///
    /// # Errors
    ///
    /// `AlreadyLinked` if `p` is linked, `Boundary` if `dir` points out of
    /// the chain from a sentinel, `NotLinked` if `at` is not linked into this
    /// chain
    pub fn link<T>(&mut self, a: &mut Arena<P, T>, at: RefPtr<P>, dir: Dir, p: P) -> Result<(), RefError>
    where
        F: Field<T, Ref = DRef<P>>,
    {
        if a.field::<F>(p)?.is_linked() {
            return Err(RefError::AlreadyLinked)
        }
        let other = self.step(a, at, dir)?;
        // fail before any link is written. A sentinel resolves to this chain's
        // own, so `at` must be its neighbor's neighbor.
        if self.record(a, other)?.r[dir.opposite().inx()] != Some(at) {
            return Err(RefError::NotLinked)
        }
        let d = dir.inx();
        let o = dir.opposite().inx();
        {
            let dref = a.field_mut::<F>(p)?;
            dref.r[d] = Some(other);
            dref.r[o] = Some(at);
        }
        self.record_mut(a, at)?.r[d] = Some(RefPtr::Elem(p));
        self.record_mut(a, other)?.r[o] = Some(RefPtr::Elem(p));
        Ok(())
    }

    /// Links `p` as the first element
    pub fn push_front<T>(&mut self, a: &mut Arena<P, T>, p: P) -> Result<(), RefError>
    where
        F: Field<T, Ref = DRef<P>>,
    {
        self.link(a, RefPtr::Head, Dir::Next, p)
    }

    /// Links `p` as the last element
    pub fn push_back<T>(&mut self, a: &mut Arena<P, T>, p: P) -> Result<(), RefError>
    where
        F: Field<T, Ref = DRef<P>>,
    {
        self.link(a, RefPtr::Tail, Dir::Prev, p)
    }

    /// Unlinks `p`, joining its neighbors to each other. The reference of `p`
    /// is left unlinked.
    ///
    /// # Errors
    ///
    /// `NotLinked` if `p` is not linked into this chain, in which case nothing
    /// is written
    pub fn unlink<T>(&mut self, a: &mut Arena<P, T>, p: P) -> Result<(), RefError>
    where
        F: Field<T, Ref = DRef<P>>,
    {
        let dref = *a.field::<F>(p)?;
        let (Some(next), Some(prev)) = (dref.r[NEXT], dref.r[PREV]) else {
            return Err(RefError::NotLinked)
        };
        let this = Some(RefPtr::Elem(p));
        if (self.record(a, next)?.r[PREV] != this) || (self.record(a, prev)?.r[NEXT] != this) {
            // `p` is linked into a different chain
            return Err(RefError::NotLinked)
        }
        self.record_mut(a, prev)?.r[NEXT] = Some(next);
        self.record_mut(a, next)?.r[PREV] = Some(prev);
        *a.field_mut::<F>(p)? = DRef::new();
        Ok(())
    }

    /// Unlinks and returns the first element
    pub fn pop_front<T>(&mut self, a: &mut Arena<P, T>) -> Result<Option<P>, RefError>
    where
        F: Field<T, Ref = DRef<P>>,
    {
        match self.first() {
            Some(p) => self.unlink(a, p).map(|_| Some(p)),
            None => Ok(None),
        }
    }

    /// Unlinks and returns the last element
    pub fn pop_back<T>(&mut self, a: &mut Arena<P, T>) -> Result<Option<P>, RefError>
    where
        F: Field<T, Ref = DRef<P>>,
    {
        match self.last() {
            Some(p) => self.unlink(a, p).map(|_| Some(p)),
            None => Ok(None),
        }
    }

    /// Unlinks every element
    pub fn clear<T>(&mut self, a: &mut Arena<P, T>) -> Result<(), RefError>
    where
        F: Field<T, Ref = DRef<P>>,
    {
        while self.pop_front(a)?.is_some() {}
        Ok(())
    }

    /// Starting after `from`, walks in direction `dir` and returns the first
    /// element that `matcher` matches. Returns `None` when the walk reaches a
    /// sentinel.
    pub fn find<T, M: Matcher<P, T>>(
        &self,
        a: &Arena<P, T>,
        from: RefPtr<P>,
        dir: Dir,
        matcher: M,
    ) -> Result<Option<P>, RefError>
    where
        F: Field<T, Ref = DRef<P>>,
    {
        let mut r = self.step(a, from, dir)?;
        while let RefPtr::Elem(p) = r {
            let t = a.cast(r)?;
            if matcher.matches(p, t) {
                return Ok(Some(p))
            }
            r = F::get(t).r[dir.inx()].ok_or(RefError::NotLinked)?;
        }
        Ok(None)
    }

    /// Iterates over `(P, &T)` in direction `dir`, starting from the first
    /// element for `Dir::Next` or the last for `Dir::Prev`
    pub fn iter<'a, T>(&'a self, a: &'a Arena<P, T>, dir: Dir) -> DIter<'a, P, F, T>
    where
        F: Field<T, Ref = DRef<P>>,
    {
        let r = match dir {
            Dir::Next => self.head.r[NEXT],
            Dir::Prev => self.tail.r[PREV],
        };
        DIter {
            a,
            r,
            dir,
            _boo: PhantomData,
        }
    }
}

/// Iterator over the elements of a [DChain] in one direction. Ends early if it
/// meets a broken link.
pub struct DIter<'a, P: Ptr, F, T> {
    a: &'a Arena<P, T>,
    r: Option<RefPtr<P>>,
    dir: Dir,
    _boo: PhantomData<fn() -> F>,
}

impl<'a, P: Ptr, F: Field<T, Ref = DRef<P>>, T> Iterator for DIter<'a, P, F, T> {
    type Item = (P, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let p = self.r?.as_elem()?;
        let t = self.a.get(p)?;
        self.r = F::get(t).r[self.dir.inx()];
        Some((p, t))
    }
}

impl<P: Ptr, F> Default for DChain<P, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Ptr, F> Clone for DChain<P, F> {
    fn clone(&self) -> Self {
        Self {
            head: self.head,
            tail: self.tail,
            _boo: PhantomData,
        }
    }
}

impl<P: Ptr, F> fmt::Debug for DChain<P, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DChain")
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}

impl<P: Ptr, F> Recast<P> for DChain<P, F> {
    fn recast<R: Recaster<Item = P>>(&mut self, recaster: &R) -> Result<(), <R as Recaster>::Item> {
        self.head.recast(recaster)?;
        self.tail.recast(recaster)
    }
}
