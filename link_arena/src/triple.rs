use alloc::vec::Vec;
use core::{cmp::Ordering, fmt, marker::PhantomData};

use recasting::{Recast, Recaster};

use crate::{Arena, Comparator, Dir, Field, Order, Ptr, RefError, RefPtr, TRef};

/// The result of [TTree::locate]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locate<P: Ptr> {
    /// The order predicate returned `Equal` at this element
    Found(P),
    /// The search ended at the empty `dir` child slot of `parent`, which is
    /// where an element with the searched for position can be
    /// [attached](TTree::attach). `parent` is `Head` only when the tree is
    /// empty.
    Vacant { parent: RefPtr<P>, dir: Dir },
}

/// A binary tree of elements linked through parent-linked [TRef]s.
///
/// `head[Dir::LEFT]` holds the root (or the tail when empty), the root's
/// `top` is the head, and the tail stands in for every absent child, so that
/// every linked reference has all three links set. Lesser elements are on the
/// [Dir::LEFT] side according to the comparator `C`, which is fixed at
/// construction. There is no implicit comparator,
/// [IdentityOrder](crate::IdentityOrder) is the one to name when any
/// consistent order will do.
///
/// The tree provides the structural primitives that balancing schemes are
/// built out of (attach, unlink, rotate, ascent through `top`) but does no
/// balancing itself.
///
/// ```
/// use link_arena::{ptr_struct, ref_field, Arena, ByKey, TRef, TTree};
///
/// ptr_struct!(P0);
///
/// struct Timer {
///     deadline: u64,
///     by_deadline: TRef<P0>,
/// }
///
/// ref_field!(ByDeadline => Timer { by_deadline: TRef<P0> });
///
/// let mut a: Arena<P0, Timer> = Arena::new();
/// let mut tree = TTree::<P0, ByDeadline, _>::new(ByKey(|t: &Timer| t.deadline));
/// let mut timers = vec![];
/// for deadline in [50, 10, 30, 20] {
///     let p = a.insert(Timer { deadline, by_deadline: TRef::new() });
///     tree.insert(&mut a, p).unwrap();
///     timers.push(p);
/// }
///
/// let deadlines: Vec<u64> = tree.iter(&a).map(|(_, t)| t.deadline).collect();
/// assert_eq!(deadlines, [10, 20, 30, 50]);
///
/// let found = tree.search(&a, |_: P0, t: &Timer| t.deadline.cmp(&30)).unwrap();
/// assert_eq!(found, Some(timers[2]));
///
/// tree.unlink(&mut a, timers[1]).unwrap();
/// assert_eq!(tree.first(&a).unwrap(), Some(timers[3]));
/// ```
pub struct TTree<P: Ptr, F, C> {
    head: TRef<P>,
    tail: TRef<P>,
    cmp: C,
    _boo: PhantomData<fn() -> F>,
}

impl<P: Ptr, F, C> TTree<P, F, C> {
    /// Creates an empty tree ordered by `cmp`
    pub fn new(cmp: C) -> Self {
        let mut head = TRef::new();
        head.r[Dir::LEFT.inx()] = Some(RefPtr::Tail);
        Self {
            head,
            tail: TRef::new(),
            cmp,
            _boo: PhantomData,
        }
    }

    #[cfg(feature = "serde_support")]
    pub(crate) fn from_sentinels(head: TRef<P>, tail: TRef<P>, cmp: C) -> Self {
        Self {
            head,
            tail,
            cmp,
            _boo: PhantomData,
        }
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    pub fn head(&self) -> &TRef<P> {
        &self.head
    }

    pub fn tail(&self) -> &TRef<P> {
        &self.tail
    }

    pub fn is_empty(&self) -> bool {
        self.head.r[Dir::LEFT.inx()] == Some(RefPtr::Tail)
    }

    pub fn root(&self) -> Option<P> {
        self.head.r[Dir::LEFT.inx()].and_then(RefPtr::as_elem)
    }
}

impl<P: Ptr, F, C> TTree<P, F, C> {
    /// Used by tests
    #[doc(hidden)]
    pub fn _check_invariants<T>(this: &Self, a: &Arena<P, T>) -> Result<(), &'static str>
    where
        F: Field<T, Ref = TRef<P>>,
        C: Comparator<P, T>,
    {
        if this.head.top.is_some() || this.head.r[Dir::RIGHT.inx()].is_some() {
            return Err("head has links besides the root")
        }
        if this.tail.is_linked() || this.tail.r != [None, None] {
            return Err("tail has links")
        }
        let root = match this.head.r[Dir::LEFT.inx()] {
            Some(RefPtr::Tail) => return Ok(()),
            Some(RefPtr::Elem(root)) => root,
            _ => return Err("head does not link to a root"),
        };
        // check the structure
        let mut count = 0usize;
        let mut stack = Vec::new();
        stack.push((root, RefPtr::Head));
        while let Some((p, top)) = stack.pop() {
            count += 1;
            if count > a.len() {
                return Err("cycle")
            }
            let Ok(node) = a.field::<F>(p) else {
                return Err("dangling link")
            };
            if node.top != Some(top) {
                return Err("`top` does not link to the parent")
            }
            for child in node.r {
                match child {
                    Some(RefPtr::Tail) => (),
                    Some(RefPtr::Elem(c)) => stack.push((c, RefPtr::Elem(p))),
                    Some(RefPtr::Head) => return Err("child link to head"),
                    None => return Err("unset child link"),
                }
            }
        }
        // check the ordering
        let mut prev: Option<P> = None;
        for (p, t) in this.iter(a) {
            if let Some(prev) = prev {
                let Ok(t_prev) = a.cast(RefPtr::Elem(prev)) else {
                    return Err("dangling link")
                };
                if this.cmp.compare(prev, t_prev, p, t) == Ordering::Greater {
                    return Err("incorrect ordering")
                }
            }
            prev = Some(p);
            count -= 1;
        }
        if count != 0 {
            return Err("in order walk does not visit every element")
        }
        Ok(())
    }

    fn record<'a, T>(&'a self, a: &'a Arena<P, T>, r: RefPtr<P>) -> Result<&'a TRef<P>, RefError>
    where
        F: Field<T, Ref = TRef<P>>,
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
    ) -> Result<&'a mut TRef<P>, RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        match r {
            RefPtr::Head => Ok(&mut self.head),
            RefPtr::Tail => Ok(&mut self.tail),
            RefPtr::Elem(p) => a.field_mut::<F>(p),
        }
    }

    /// Returns the linked record of element `p`
    fn node<T>(a: &Arena<P, T>, p: P) -> Result<TRef<P>, RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        let node = *a.field::<F>(p)?;
        if node.is_linked() {
            Ok(node)
        } else {
            Err(RefError::NotLinked)
        }
    }

    /// Checks that `child` is a child of `top`. A `Head` resolves to this
    /// tree's own head, so an element of another tree fails here.
    fn check_child<T>(&self, a: &Arena<P, T>, top: RefPtr<P>, child: RefPtr<P>) -> Result<(), RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        self.record(a, top)?.side_of(child).ok_or(RefError::NotLinked)?;
        Ok(())
    }

    /// Points the child slot of `top` that holds `old` to `new`
    fn replace_child<T>(
        &mut self,
        a: &mut Arena<P, T>,
        top: RefPtr<P>,
        old: RefPtr<P>,
        new: RefPtr<P>,
    ) -> Result<(), RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        let rec = self.record_mut(a, top)?;
        let side = rec.side_of(old).ok_or(RefError::NotLinked)?;
        rec.r[side.inx()] = Some(new);
        Ok(())
    }

    /// Sets the `top` of `child` if it is an element
    fn set_top<T>(a: &mut Arena<P, T>, child: RefPtr<P>, top: RefPtr<P>) -> Result<(), RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        if let RefPtr::Elem(c) = child {
            a.field_mut::<F>(c)?.top = Some(top);
        }
        Ok(())
    }

    /// Binary search guided by `order`, which is given each examined element
    /// and returns its ordering relative to the target. Descends toward
    /// [Dir::RIGHT] on `Less` and toward [Dir::LEFT] on `Greater`.
    pub fn locate<T, O: Order<P, T>>(&self, a: &Arena<P, T>, order: O) -> Result<Locate<P>, RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        let mut parent = RefPtr::Head;
        let mut dir = Dir::LEFT;
        let mut r = self.head.r[dir.inx()].ok_or(RefError::NotLinked)?;
        for _ in 0..=a.len() {
            let p = match r {
                RefPtr::Elem(p) => p,
                RefPtr::Tail => return Ok(Locate::Vacant { parent, dir }),
                RefPtr::Head => return Err(RefError::Boundary),
            };
            let t = a.cast(r)?;
            dir = match order.order(p, t) {
                Ordering::Equal => return Ok(Locate::Found(p)),
                Ordering::Less => Dir::RIGHT,
                Ordering::Greater => Dir::LEFT,
            };
            parent = r;
            r = F::get(t).r[dir.inx()].ok_or(RefError::NotLinked)?;
        }
        Err(RefError::Dangling)
    }

    /// Returns the element where `order` returns `Equal`, if the search finds
    /// one
    pub fn search<T, O: Order<P, T>>(&self, a: &Arena<P, T>, order: O) -> Result<Option<P>, RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        match self.locate(a, order)? {
            Locate::Found(p) => Ok(Some(p)),
            Locate::Vacant { .. } => Ok(None),
        }
    }

    /// Links the unlinked element `p` as a leaf in the `dir` child slot of
    /// `parent`. Use `parent == Head` with `Dir::LEFT` to set the root of an
    /// empty tree.
    ///
    /// This does not consult the comparator, it is up to the caller to pick a
    /// slot that keeps the tree ordered, usually from [TTree::locate].
    ///
    /// # Errors
    ///
    /// `AlreadyLinked` if `p` is linked, `Boundary` if the slot is not an
    /// empty child slot
    pub fn attach<T>(&mut self, a: &mut Arena<P, T>, parent: RefPtr<P>, dir: Dir, p: P) -> Result<(), RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        if a.field::<F>(p)?.is_linked() {
            return Err(RefError::AlreadyLinked)
        }
        match parent {
            RefPtr::Tail => return Err(RefError::Boundary),
            RefPtr::Head if dir != Dir::LEFT => return Err(RefError::Boundary),
            _ => (),
        }
        if self.record(a, parent)?.r[dir.inx()] != Some(RefPtr::Tail) {
            return Err(RefError::Boundary)
        }
        *a.field_mut::<F>(p)? = TRef {
            r: [Some(RefPtr::Tail), Some(RefPtr::Tail)],
            top: Some(parent),
        };
        self.record_mut(a, parent)?.r[dir.inx()] = Some(RefPtr::Elem(p));
        Ok(())
    }

    /// Links the unlinked element `p` as a leaf, descending by the
    /// comparator from the root. `p` goes left of elements it compares `Less`
    /// to and right otherwise, so equal elements keep insertion order.
    pub fn insert<T>(&mut self, a: &mut Arena<P, T>, p: P) -> Result<(), RefError>
    where
        F: Field<T, Ref = TRef<P>>,
        C: Comparator<P, T>,
    {
        let t_new = a.get(p).ok_or(RefError::Dangling)?;
        if F::get(t_new).is_linked() {
            return Err(RefError::AlreadyLinked)
        }
        let mut parent = RefPtr::Head;
        let mut dir = Dir::LEFT;
        let mut r = self.head.r[dir.inx()].ok_or(RefError::NotLinked)?;
        for _ in 0..=a.len() {
            let q = match r {
                RefPtr::Elem(q) => q,
                RefPtr::Tail => return self.attach(a, parent, dir, p),
                RefPtr::Head => return Err(RefError::Boundary),
            };
            let t = a.cast(r)?;
            dir = match self.cmp.compare(p, t_new, q, t) {
                Ordering::Less => Dir::LEFT,
                Ordering::Equal | Ordering::Greater => Dir::RIGHT,
            };
            parent = r;
            r = F::get(t).r[dir.inx()].ok_or(RefError::NotLinked)?;
        }
        Err(RefError::Dangling)
    }

    /// Unlinks `p` from the tree. If `p` has two children, its in order
    /// successor takes its place. The reference of `p` is left unlinked.
    pub fn unlink<T>(&mut self, a: &mut Arena<P, T>, p: P) -> Result<(), RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        let node = Self::node(a, p)?;
        let (Some(top), Some(l), Some(r)) = (node.top, node.r[0], node.r[1]) else {
            return Err(RefError::NotLinked)
        };
        let this = RefPtr::Elem(p);
        match (l, r) {
            (RefPtr::Tail, child) | (child, RefPtr::Tail) => {
                self.replace_child(a, top, this, child)?;
                Self::set_top(a, child, top)?;
            }
            (_, RefPtr::Elem(p_r)) => {
                let s = self.extreme(a, p_r, Dir::LEFT)?;
                let succ = RefPtr::Elem(s);
                let s_node = Self::node(a, s)?;
                let (Some(s_top), Some(s_r)) = (s_node.top, s_node.r[1]) else {
                    return Err(RefError::NotLinked)
                };
                self.check_child(a, top, this)?;
                self.check_child(a, s_top, succ)?;
                if s != p_r {
                    // detach the successor, which has no left child
                    self.replace_child(a, s_top, succ, s_r)?;
                    Self::set_top(a, s_r, s_top)?;
                    a.field_mut::<F>(s)?.r[1] = Some(r);
                    Self::set_top(a, r, succ)?;
                }
                {
                    let s_ref = a.field_mut::<F>(s)?;
                    s_ref.r[0] = Some(l);
                    s_ref.top = Some(top);
                }
                Self::set_top(a, l, succ)?;
                self.replace_child(a, top, this, succ)?;
            }
            _ => return Err(RefError::Boundary),
        }
        *a.field_mut::<F>(p)? = TRef::new();
        Ok(())
    }

    /// Rotates `p` down toward `dir`. The child of `p` on the opposite side
    /// takes the place of `p`, and its `dir` subtree becomes the opposite
    /// subtree of `p`. The in order sequence is unchanged.
    ///
    /// # Errors
    ///
    /// `Boundary` if `p` has no child on the opposite side, `NotLinked` if `p`
    /// is not linked into this tree. Nothing is written on failure.
    pub fn rotate<T>(&mut self, a: &mut Arena<P, T>, p: P, dir: Dir) -> Result<(), RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        let d = dir.inx();
        let o = dir.opposite().inx();
        let node = Self::node(a, p)?;
        let (Some(top), Some(child)) = (node.top, node.r[o]) else {
            return Err(RefError::NotLinked)
        };
        let c = child.as_elem().ok_or(RefError::Boundary)?;
        let inner = Self::node(a, c)?.r[d].ok_or(RefError::NotLinked)?;
        let this = RefPtr::Elem(p);
        self.check_child(a, top, this)?;

        {
            let p_ref = a.field_mut::<F>(p)?;
            p_ref.r[o] = Some(inner);
            p_ref.top = Some(child);
        }
        Self::set_top(a, inner, this)?;
        {
            let c_ref = a.field_mut::<F>(c)?;
            c_ref.r[d] = Some(this);
            c_ref.top = Some(top);
        }
        self.replace_child(a, top, this, child)
    }

    /// Follows `dir` children from `p` until the last element
    fn extreme<T>(&self, a: &Arena<P, T>, mut p: P, dir: Dir) -> Result<P, RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        for _ in 0..a.len() {
            match Self::node(a, p)?.r[dir.inx()] {
                Some(RefPtr::Elem(c)) => p = c,
                Some(RefPtr::Tail) => return Ok(p),
                _ => return Err(RefError::NotLinked),
            }
        }
        Err(RefError::Dangling)
    }

    /// Returns the least element
    pub fn first<T>(&self, a: &Arena<P, T>) -> Result<Option<P>, RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        match self.root() {
            Some(root) => self.extreme(a, root, Dir::LEFT).map(Some),
            None => Ok(None),
        }
    }

    /// Returns the greatest element
    pub fn last<T>(&self, a: &Arena<P, T>) -> Result<Option<P>, RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        match self.root() {
            Some(root) => self.extreme(a, root, Dir::RIGHT).map(Some),
            None => Ok(None),
        }
    }

    /// Returns the in order neighbor of `p` on the `dir` side. If `p` has no
    /// subtree on that side, this ascends through `top` links until it
    /// arrives from the opposite side.
    pub fn step<T>(&self, a: &Arena<P, T>, p: P, dir: Dir) -> Result<Option<P>, RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        let node = Self::node(a, p)?;
        if let Some(RefPtr::Elem(c)) = node.r[dir.inx()] {
            return self.extreme(a, c, dir.opposite()).map(Some)
        }
        let mut cur = p;
        for _ in 0..a.len() {
            match Self::node(a, cur)?.top {
                Some(RefPtr::Elem(top)) => {
                    if Self::node(a, top)?.r[dir.opposite().inx()] == Some(RefPtr::Elem(cur)) {
                        return Ok(Some(top))
                    }
                    cur = top;
                }
                Some(RefPtr::Head) => return Ok(None),
                _ => return Err(RefError::NotLinked),
            }
        }
        Err(RefError::Dangling)
    }

    /// The in order successor of `p`
    pub fn next<T>(&self, a: &Arena<P, T>, p: P) -> Result<Option<P>, RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        self.step(a, p, Dir::RIGHT)
    }

    /// The in order predecessor of `p`
    pub fn prev<T>(&self, a: &Arena<P, T>, p: P) -> Result<Option<P>, RefError>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        self.step(a, p, Dir::LEFT)
    }

    /// Iterates over `(P, &T)` in order. Ends early if it meets a broken link.
    pub fn iter<'a, T>(&'a self, a: &'a Arena<P, T>) -> TIter<'a, P, F, C, T>
    where
        F: Field<T, Ref = TRef<P>>,
    {
        TIter {
            tree: self,
            a,
            p: self.first(a).ok().flatten(),
        }
    }
}

/// In order iterator over the elements of a [TTree]
pub struct TIter<'a, P: Ptr, F, C, T> {
    tree: &'a TTree<P, F, C>,
    a: &'a Arena<P, T>,
    p: Option<P>,
}

impl<'a, P: Ptr, F: Field<T, Ref = TRef<P>>, C, T> Iterator for TIter<'a, P, F, C, T> {
    type Item = (P, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let p = self.p?;
        let t = self.a.get(p)?;
        self.p = self.tree.next(self.a, p).ok().flatten();
        Some((p, t))
    }
}

impl<P: Ptr, F, C: Default> Default for TTree<P, F, C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<P: Ptr, F, C: Clone> Clone for TTree<P, F, C> {
    fn clone(&self) -> Self {
        Self {
            head: self.head,
            tail: self.tail,
            cmp: self.cmp.clone(),
            _boo: PhantomData,
        }
    }
}

impl<P: Ptr, F, C> fmt::Debug for TTree<P, F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TTree")
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}

impl<P: Ptr, F, C> Recast<P> for TTree<P, F, C> {
    fn recast<R: Recaster<Item = P>>(&mut self, recaster: &R) -> Result<(), <R as Recaster>::Item> {
        self.head.recast(recaster)?;
        self.tail.recast(recaster)
    }
}
