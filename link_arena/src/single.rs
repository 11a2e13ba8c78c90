use core::{fmt, marker::PhantomData};

use recasting::{Recast, Recaster};

use crate::{Arena, Field, Matcher, Ptr, RefError, RefPtr, SRef};

/// A singly linked chain of elements bounded by head and tail sentinels.
///
/// `F` selects which [SRef] of the element type the chain links through.
/// The chain only owns its two sentinel records; elements live in an
/// application owned [Arena] that is passed to every operation.
///
/// ```
/// use link_arena::{ptr_struct, ref_field, Arena, RefPtr, SChain, SRef};
///
/// ptr_struct!(P0);
///
/// struct Frame {
///     id: u32,
///     stack: SRef<P0>,
/// }
///
/// ref_field!(Stack => Frame { stack: SRef<P0> });
///
/// let mut a: Arena<P0, Frame> = Arena::new();
/// let mut s: SChain<P0, Stack> = SChain::new();
///
/// let p0 = a.insert(Frame { id: 0, stack: SRef::new() });
/// let p1 = a.insert(Frame { id: 1, stack: SRef::new() });
/// s.push_front(&mut a, p0).unwrap();
/// s.push_front(&mut a, p1).unwrap();
///
/// let ids: Vec<u32> = s.iter(&a).map(|(_, frame)| frame.id).collect();
/// assert_eq!(ids, [1, 0]);
///
/// // the last element links to the tail sentinel
/// assert_eq!(a[p0].stack.next(), Some(RefPtr::Tail));
///
/// assert_eq!(s.pop_front(&mut a).unwrap(), Some(p1));
/// assert!(!a[p1].stack.is_linked());
/// ```
pub struct SChain<P: Ptr, F> {
    head: SRef<P>,
    tail: SRef<P>,
    _boo: PhantomData<fn() -> F>,
}

impl<P: Ptr, F> SChain<P, F> {
    /// Creates an empty chain where `head.next` is the tail
    pub fn new() -> Self {
        Self {
            head: SRef {
                next: Some(RefPtr::Tail),
            },
            tail: SRef::new(),
            _boo: PhantomData,
        }
    }

    #[cfg(feature = "serde_support")]
    pub(crate) fn from_sentinels(head: SRef<P>, tail: SRef<P>) -> Self {
        Self {
            head,
            tail,
            _boo: PhantomData,
        }
    }

    pub fn head(&self) -> &SRef<P> {
        &self.head
    }

    pub fn tail(&self) -> &SRef<P> {
        &self.tail
    }

    pub fn is_empty(&self) -> bool {
        self.head.next == Some(RefPtr::Tail)
    }

    /// Returns the first element, or `None` if the chain is empty
    pub fn first(&self) -> Option<P> {
        self.head.next.and_then(RefPtr::as_elem)
    }
}

impl<P: Ptr, F> SChain<P, F> {
    /// Used by tests
    #[doc(hidden)]
    pub fn _check_invariants<T>(this: &Self, a: &Arena<P, T>) -> Result<(), &'static str>
    where
        F: Field<T, Ref = SRef<P>>,
    {
        if this.tail.next.is_some() {
            return Err("tail sentinel has a next link")
        }
        let mut r = this.head.next;
        for _ in 0..=a.len() {
            match r {
                Some(RefPtr::Tail) => return Ok(()),
                Some(RefPtr::Elem(p)) => match a.field::<F>(p) {
                    Ok(sref) => r = sref.next,
                    Err(_) => return Err("dangling link"),
                },
                Some(RefPtr::Head) => return Err("link to head sentinel"),
                None => return Err("chain is broken"),
            }
        }
        Err("chain does not reach the tail")
    }

    fn record<'a, T>(&'a self, a: &'a Arena<P, T>, r: RefPtr<P>) -> Result<&'a SRef<P>, RefError>
    where
        F: Field<T, Ref = SRef<P>>,
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
    ) -> Result<&'a mut SRef<P>, RefError>
    where
        F: Field<T, Ref = SRef<P>>,
    {
        match r {
            RefPtr::Head => Ok(&mut self.head),
            RefPtr::Tail => Ok(&mut self.tail),
            RefPtr::Elem(p) => a.field_mut::<F>(p),
        }
    }

    /// Returns the reference after `at`, which is `Tail` at the end.
    ///
    /// # Errors
    ///
    /// `Boundary` if `at` is the tail, `NotLinked` if `at` is an unlinked
    /// element, `Dangling` if `at` is not in the arena
    pub fn step<T>(&self, a: &Arena<P, T>, at: RefPtr<P>) -> Result<RefPtr<P>, RefError>
    where
        F: Field<T, Ref = SRef<P>>,
    {
        if at == RefPtr::Tail {
            return Err(RefError::Boundary)
        }
        self.record(a, at)?.next.ok_or(RefError::NotLinked)
    }

    /// Links the unlinked element `p` right after `at`. `at` can be the head
    /// sentinel.
    pub fn link_after<T>(&mut self, a: &mut Arena<P, T>, at: RefPtr<P>, p: P) -> Result<(), RefError>
    where
        F: Field<T, Ref = SRef<P>>,
    {
        if a.field::<F>(p)?.is_linked() {
            return Err(RefError::AlreadyLinked)
        }
        let after = self.step(a, at)?;
        a.field_mut::<F>(p)?.next = Some(after);
        self.record_mut(a, at)?.next = Some(RefPtr::Elem(p));
        Ok(())
    }

    /// Unlinks the element right after `at` and returns it, or returns `None`
    /// if `at` is the last reference before the tail.
    pub fn unlink_after<T>(&mut self, a: &mut Arena<P, T>, at: RefPtr<P>) -> Result<Option<P>, RefError>
    where
        F: Field<T, Ref = SRef<P>>,
    {
        let p = match self.step(a, at)? {
            RefPtr::Elem(p) => p,
            RefPtr::Tail => return Ok(None),
            RefPtr::Head => return Err(RefError::Boundary),
        };
        let after = a.field_mut::<F>(p)?.next.take();
        self.record_mut(a, at)?.next = after;
        Ok(Some(p))
    }

    /// Links `p` as the first element
    pub fn push_front<T>(&mut self, a: &mut Arena<P, T>, p: P) -> Result<(), RefError>
    where
        F: Field<T, Ref = SRef<P>>,
    {
        self.link_after(a, RefPtr::Head, p)
    }

    /// Unlinks and returns the first element
    pub fn pop_front<T>(&mut self, a: &mut Arena<P, T>) -> Result<Option<P>, RefError>
    where
        F: Field<T, Ref = SRef<P>>,
    {
        self.unlink_after(a, RefPtr::Head)
    }

    /// Returns the first element after `from` that `matcher` matches
    pub fn find<T, M: Matcher<P, T>>(
        &self,
        a: &Arena<P, T>,
        from: RefPtr<P>,
        matcher: M,
    ) -> Result<Option<P>, RefError>
    where
        F: Field<T, Ref = SRef<P>>,
    {
        let mut r = self.step(a, from)?;
        while let RefPtr::Elem(p) = r {
            let t = a.cast(r)?;
            if matcher.matches(p, t) {
                return Ok(Some(p))
            }
            r = F::get(t).next.ok_or(RefError::NotLinked)?;
        }
        Ok(None)
    }

    /// Iterates over `(P, &T)` from the first element to the last
    pub fn iter<'a, T>(&'a self, a: &'a Arena<P, T>) -> SIter<'a, P, F, T>
    where
        F: Field<T, Ref = SRef<P>>,
    {
        SIter {
            a,
            r: self.head.next,
            _boo: PhantomData,
        }
    }
}

/// Iterator over the elements of an [SChain]. Ends early if it meets a broken
/// link.
pub struct SIter<'a, P: Ptr, F, T> {
    a: &'a Arena<P, T>,
    r: Option<RefPtr<P>>,
    _boo: PhantomData<fn() -> F>,
}

impl<'a, P: Ptr, F: Field<T, Ref = SRef<P>>, T> Iterator for SIter<'a, P, F, T> {
    type Item = (P, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let p = self.r?.as_elem()?;
        let t = self.a.get(p)?;
        self.r = F::get(t).next;
        Some((p, t))
    }
}

impl<P: Ptr, F> Default for SChain<P, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Ptr, F> Clone for SChain<P, F> {
    fn clone(&self) -> Self {
        Self {
            head: self.head,
            tail: self.tail,
            _boo: PhantomData,
        }
    }
}

impl<P: Ptr, F> fmt::Debug for SChain<P, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SChain")
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}

impl<P: Ptr, F> Recast<P> for SChain<P, F> {
    /// Recasts the sentinel records. The elements' records are recast by
    /// recasting the arena.
    fn recast<R: Recaster<Item = P>>(&mut self, recaster: &R) -> Result<(), <R as Recaster>::Item> {
        self.head.recast(recaster)?;
        self.tail.recast(recaster)
    }
}
