use core::{fmt, ops::Index};

use recasting::{Recast, Recaster};

use crate::{Ptr, RefError};

/// Index of the `NEXT` slot of a two slot reference
pub const NEXT: usize = 0;
/// Index of the `PREV` slot of a two slot reference
pub const PREV: usize = 1;

/// Names the two slots of a [DRef] or the two children of a [TRef].
///
/// This is only a naming convention: chains read the slots as next/previous
/// and binary shapes read the same slots as left/right, see [Dir::LEFT] and
/// [Dir::RIGHT].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dir {
    Next = 0,
    Prev = 1,
}

impl Dir {
    /// The lesser child slot in binary shapes
    pub const LEFT: Dir = Dir::Next;
    /// The greater child slot in binary shapes
    pub const RIGHT: Dir = Dir::Prev;

    /// The slot index, `NEXT` or `PREV`
    #[inline]
    pub const fn inx(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn opposite(self) -> Dir {
        match self {
            Dir::Next => Dir::Prev,
            Dir::Prev => Dir::Next,
        }
    }

    /// Returns `Next` for 0 and `Prev` for 1
    pub const fn from_inx(inx: usize) -> Option<Dir> {
        match inx {
            NEXT => Some(Dir::Next),
            PREV => Some(Dir::Prev),
            _ => None,
        }
    }
}

/// The target of a link: the head or tail sentinel of the container the link
/// belongs to, or the reference embedded in an element.
///
/// Only `Elem` can be cast back to an owner, see
/// [Arena::cast](crate::Arena::cast).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefPtr<P: Ptr> {
    Head,
    Tail,
    Elem(P),
}

impl<P: Ptr> RefPtr<P> {
    /// Returns the element handle.
    ///
    /// # Errors
    ///
    /// [RefError::Sentinel] if `self` is a sentinel
    #[inline]
    pub fn elem(self) -> Result<P, RefError> {
        match self {
            RefPtr::Elem(p) => Ok(p),
            _ => Err(RefError::Sentinel),
        }
    }

    #[inline]
    pub fn as_elem(self) -> Option<P> {
        match self {
            RefPtr::Elem(p) => Some(p),
            _ => None,
        }
    }

    #[inline]
    pub fn is_sentinel(self) -> bool {
        !matches!(self, RefPtr::Elem(_))
    }
}

impl<P: Ptr> From<P> for RefPtr<P> {
    fn from(p: P) -> Self {
        RefPtr::Elem(p)
    }
}

impl<P: Ptr> fmt::Debug for RefPtr<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefPtr::Head => f.write_str("Head"),
            RefPtr::Tail => f.write_str("Tail"),
            RefPtr::Elem(p) => fmt::Debug::fmt(p, f),
        }
    }
}

impl<P: Ptr> fmt::Display for RefPtr<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Single reference: one outgoing link.
///
/// Embedded in elements of a [SChain](crate::SChain). `next` is `None` while
/// the element is unlinked.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SRef<P: Ptr> {
    pub(crate) next: Option<RefPtr<P>>,
}

impl<P: Ptr> SRef<P> {
    /// An unlinked reference
    pub const fn new() -> Self {
        Self { next: None }
    }

    pub fn next(&self) -> Option<RefPtr<P>> {
        self.next
    }

    pub fn is_linked(&self) -> bool {
        self.next.is_some()
    }
}

/// Double reference: two outgoing links indexed by [Dir].
///
/// In a [DChain](crate::DChain), `self[Dir::Next] == Some(Elem(b))` implies
/// that `b`'s `Dir::Prev` slot points back to this reference. Both slots are
/// `None` while the element is unlinked.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DRef<P: Ptr> {
    pub(crate) r: [Option<RefPtr<P>>; 2],
}

impl<P: Ptr> DRef<P> {
    /// An unlinked reference
    pub const fn new() -> Self {
        Self { r: [None, None] }
    }

    pub fn get(&self, dir: Dir) -> Option<RefPtr<P>> {
        self.r[dir.inx()]
    }

    pub fn next(&self) -> Option<RefPtr<P>> {
        self.r[NEXT]
    }

    pub fn prev(&self) -> Option<RefPtr<P>> {
        self.r[PREV]
    }

    pub fn is_linked(&self) -> bool {
        self.r[NEXT].is_some() || self.r[PREV].is_some()
    }
}

impl<P: Ptr> Index<Dir> for DRef<P> {
    type Output = Option<RefPtr<P>>;

    fn index(&self, dir: Dir) -> &Self::Output {
        &self.r[dir.inx()]
    }
}

/// Triple reference: two child links and a `top` link to the structural
/// parent.
///
/// In a [TTree](crate::TTree), for every linked `n` with `top == Elem(p)`,
/// one of `p`'s children is `Elem(n)`. The root's `top` is `Head` and absent
/// children are `Tail`. All links are `None` while the element is unlinked.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TRef<P: Ptr> {
    pub(crate) r: [Option<RefPtr<P>>; 2],
    pub(crate) top: Option<RefPtr<P>>,
}

impl<P: Ptr> TRef<P> {
    /// An unlinked reference
    pub const fn new() -> Self {
        Self {
            r: [None, None],
            top: None,
        }
    }

    pub fn child(&self, dir: Dir) -> Option<RefPtr<P>> {
        self.r[dir.inx()]
    }

    pub fn top(&self) -> Option<RefPtr<P>> {
        self.top
    }

    pub fn is_linked(&self) -> bool {
        self.top.is_some()
    }

    /// Returns which child slot of `self` holds `child`
    pub(crate) fn side_of(&self, child: RefPtr<P>) -> Option<Dir> {
        if self.r[0] == Some(child) {
            Some(Dir::LEFT)
        } else if self.r[1] == Some(child) {
            Some(Dir::RIGHT)
        } else {
            None
        }
    }
}

impl<P: Ptr> Index<Dir> for TRef<P> {
    type Output = Option<RefPtr<P>>;

    fn index(&self, dir: Dir) -> &Self::Output {
        &self.r[dir.inx()]
    }
}

impl<P: Ptr> Default for SRef<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Ptr> Default for DRef<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Ptr> Default for TRef<P> {
    fn default() -> Self {
        Self::new()
    }
}

struct Link<P: Ptr>(Option<RefPtr<P>>);

impl<P: Ptr> fmt::Debug for Link<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(r) => fmt::Debug::fmt(&r, f),
            None => f.write_str("-"),
        }
    }
}

impl<P: Ptr> fmt::Debug for SRef<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(-> {:?})", Link(self.next))
    }
}

impl<P: Ptr> fmt::Debug for DRef<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?} <-> {:?})", Link(self.r[PREV]), Link(self.r[NEXT]))
    }
}

impl<P: Ptr> fmt::Debug for TRef<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(^ {:?}, {:?}, {:?})",
            Link(self.top),
            Link(self.r[0]),
            Link(self.r[1])
        )
    }
}

fn recast_link<P: Ptr, R: Recaster<Item = P>>(
    link: &mut Option<RefPtr<P>>,
    recaster: &R,
) -> Result<(), P> {
    if let Some(r) = link {
        r.recast(recaster)?;
    }
    Ok(())
}

impl<P: Ptr> Recast<P> for RefPtr<P> {
    fn recast<R: Recaster<Item = P>>(&mut self, recaster: &R) -> Result<(), <R as Recaster>::Item> {
        match self {
            RefPtr::Elem(p) => recaster.recast_item(p),
            _ => Ok(()),
        }
    }
}

impl<P: Ptr> Recast<P> for SRef<P> {
    fn recast<R: Recaster<Item = P>>(&mut self, recaster: &R) -> Result<(), <R as Recaster>::Item> {
        recast_link(&mut self.next, recaster)
    }
}

impl<P: Ptr> Recast<P> for DRef<P> {
    fn recast<R: Recaster<Item = P>>(&mut self, recaster: &R) -> Result<(), <R as Recaster>::Item> {
        recast_link(&mut self.r[0], recaster)?;
        recast_link(&mut self.r[1], recaster)
    }
}

impl<P: Ptr> Recast<P> for TRef<P> {
    fn recast<R: Recaster<Item = P>>(&mut self, recaster: &R) -> Result<(), <R as Recaster>::Item> {
        recast_link(&mut self.r[0], recaster)?;
        recast_link(&mut self.r[1], recaster)?;
        recast_link(&mut self.top, recaster)
    }
}
