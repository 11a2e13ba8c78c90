use std::cmp::Ordering;

use link_arena::{
    ptr_struct, ref_field, Arena, Comparator, DChain, DRef, Dir, Recast, Recaster, RefPtr, SChain,
    SRef, TRef, TTree,
};
use rand_xoshiro::{
    rand_core::{RngCore, SeedableRng},
    Xoshiro128StarStar,
};

ptr_struct!(P0);

/// An element that can be linked into one container of each shape at once
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde_support",
    derive(serde_derive::Serialize, serde_derive::Deserialize)
)]
pub struct Elem {
    /// unique id for checking that the correct elements are returned
    pub id: u64,
    /// the ordering key, may have duplicates
    pub key: u64,
    pub stack: SRef<P0>,
    pub queue: DRef<P0>,
    pub node: TRef<P0>,
}

impl Elem {
    pub fn new(id: u64, key: u64) -> Self {
        Self {
            id,
            key,
            stack: SRef::new(),
            queue: DRef::new(),
            node: TRef::new(),
        }
    }
}

impl Recast<P0> for Elem {
    fn recast<R: Recaster<Item = P0>>(&mut self, recaster: &R) -> Result<(), <R as Recaster>::Item> {
        self.stack.recast(recaster)?;
        self.queue.recast(recaster)?;
        self.node.recast(recaster)
    }
}

ref_field!(
    pub Stack => Elem { stack: SRef<P0> };
    pub Queue => Elem { queue: DRef<P0> };
    pub Node => Elem { node: TRef<P0> };
);

/// Orders `Elem`s by `key` only
#[derive(Debug, Clone, Copy, Default)]
pub struct ByElemKey;

impl Comparator<P0, Elem> for ByElemKey {
    fn compare(&self, _: P0, t0: &Elem, _: P0, t1: &Elem) -> Ordering {
        t0.key.cmp(&t1.key)
    }
}

pub type Stack0 = SChain<P0, Stack>;
pub type Queue0 = DChain<P0, Queue>;
pub type Tree0 = TTree<P0, Node, ByElemKey>;

/// An arena with all three kinds of containers over it
#[derive(Debug, Default)]
pub struct Containers {
    pub a: Arena<P0, Elem>,
    pub stack: Stack0,
    pub queue: Queue0,
    pub tree: Tree0,
}

impl Containers {
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        Arena::_check_invariants(&self.a)?;
        SChain::_check_invariants(&self.stack, &self.a)?;
        DChain::_check_invariants(&self.queue, &self.a)?;
        TTree::_check_invariants(&self.tree, &self.a)
    }

    /// Element ids in the order of each container: the stack front to back,
    /// the queue front to back, and the tree in order
    pub fn ids(&self) -> (Vec<u64>, Vec<u64>, Vec<u64>) {
        (
            self.stack.iter(&self.a).map(|(_, e)| e.id).collect(),
            self.queue.iter(&self.a, Dir::Next).map(|(_, e)| e.id).collect(),
            self.tree.iter(&self.a).map(|(_, e)| e.id).collect(),
        )
    }
}

/// A state with elements linked into every container in different orders,
/// some unlinked elements, and freed slots in the arena
pub fn std_containers() -> Containers {
    let mut rng = Xoshiro128StarStar::seed_from_u64(0);
    let mut c = Containers::default();
    let mut ps = vec![];
    for id in 0..64u64 {
        let key = u64::from(rng.next_u32() % 16);
        let p = c.a.insert(Elem::new(id, key));
        ps.push(p);
        if (id % 5) != 0 {
            c.stack.push_front(&mut c.a, p).unwrap();
        }
        if (id % 3) == 0 {
            c.queue.push_front(&mut c.a, p).unwrap();
        } else {
            c.queue.push_back(&mut c.a, p).unwrap();
        }
        if (id % 7) != 0 {
            c.tree.insert(&mut c.a, p).unwrap();
        }
    }
    // free some slots, unlinking first
    for p in ps.iter().copied().step_by(4) {
        let id = c.a[p].id;
        if (id % 5) != 0 {
            let mut at = RefPtr::Head;
            while c.stack.step(&c.a, at).unwrap() != RefPtr::Elem(p) {
                at = c.stack.step(&c.a, at).unwrap();
            }
            assert_eq!(c.stack.unlink_after(&mut c.a, at).unwrap(), Some(p));
        }
        c.queue.unlink(&mut c.a, p).unwrap();
        if (id % 7) != 0 {
            c.tree.unlink(&mut c.a, p).unwrap();
        }
        c.a.remove(p).unwrap();
    }
    c.check_invariants().unwrap();
    c
}
