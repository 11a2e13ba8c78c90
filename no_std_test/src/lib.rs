//! insures that the crate is `no_std` and also has some `cargo-show-asm`
//! targets to check
//!
//! `cargo asm --target=riscv32i-unknown-none-elf -p no_std_test`

#![no_std]
#![allow(clippy::all)]

use link_arena::{
    ptr_struct, ref_field, Arena, ByOrd, DChain, DRef, Dir, RefError, RefPtr, TRef, TTree,
};

ptr_struct!(P0());
ptr_struct!(P1);

pub struct Elem {
    pub x: u64,
    pub link: DRef<P1>,
    pub node: TRef<P1>,
}

impl PartialEq for Elem {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x
    }
}

impl Eq for Elem {}

impl PartialOrd for Elem {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Elem {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.x.cmp(&other.x)
    }
}

ref_field!(
    Link => Elem { link: DRef<P1> };
    Node => Elem { node: TRef<P1> };
);

pub fn asm_arena_get(a: &Arena<P0, u64>, inx: P0) -> u64 {
    *a.get(inx).unwrap()
}

pub fn asm_arena_get_gen(a: &Arena<P1, u64>, inx: P1) -> u64 {
    *a.get(inx).unwrap()
}

// make sure this especially is minimal
pub fn asm_cast(a: &Arena<P1, Elem>, r: RefPtr<P1>) -> Result<u64, RefError> {
    a.cast(r).map(|e| e.x)
}

pub fn asm_step(chain: &DChain<P1, Link>, a: &Arena<P1, Elem>, p: P1) -> Option<P1> {
    chain.step(a, RefPtr::Elem(p), Dir::Next).ok()?.as_elem()
}

pub fn asm_unlink(
    chain: &mut DChain<P1, Link>,
    a: &mut Arena<P1, Elem>,
    p: P1,
) -> Result<(), RefError> {
    chain.unlink(a, p)
}

pub fn asm_tree_insert(
    tree: &mut TTree<P1, Node, ByOrd>,
    a: &mut Arena<P1, Elem>,
    p: P1,
) -> Result<(), RefError> {
    tree.insert(a, p)
}
